use super::*;
use crate::test_support::try_create_device;
use assert_fs::prelude::*;
use base64::Engine;
use serial_test::serial;
use std::io::Write;

const QUAD_OBJ: &str = "\
# two triangles sharing an edge
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
f 1 2 3
f 1 3 4
";

fn parse(source: &str) -> LoadedMesh {
    ModelLoader::parse_obj(source).expect("source should parse")
}

fn parse_err(source: &str) -> LoadError {
    ModelLoader::parse_obj(source).expect_err("source should be rejected")
}

#[test]
fn test_model_vertex_size() {
    assert_eq!(
        std::mem::size_of::<ModelVertex>(),
        32, // 3 * 4 (position) + 2 * 4 (tex_coords) + 3 * 4 (normal)
        "ModelVertex size should be 32 bytes"
    );
}

#[test]
fn test_vertex_buffer_layout() {
    let layout = ModelVertex::layout();
    let buffer_layout = layout.buffer_layout();
    assert_eq!(buffer_layout.array_stride, 32);
    assert_eq!(buffer_layout.step_mode, wgpu::VertexStepMode::Vertex);
    assert_eq!(buffer_layout.attributes.len(), 3);

    let offsets: Vec<_> = layout.attributes().iter().map(|a| a.offset).collect();
    let locations: Vec<_> = layout.attributes().iter().map(|a| a.shader_location).collect();
    assert_eq!(offsets, vec![0, 12, 20]);
    assert_eq!(locations, vec![0, 1, 2]);
    assert_eq!(layout.attributes()[1].format, wgpu::VertexFormat::Float32x2);
}

#[test]
fn test_screen_space_layout() {
    let layout = VertexLayout::new(&[VertexAttribute::Position2D(0), VertexAttribute::TexCoord(1)]);
    assert_eq!(layout.floats_per_vertex(), 4);
    assert_eq!(layout.stride(), 16);
    assert_eq!(layout.attributes()[1].offset, 8);
}

#[test]
fn test_load_quad_defaults_missing_attributes() {
    let loaded = parse(QUAD_OBJ);
    let mesh = &loaded.mesh;

    assert_eq!(mesh.vertices().len(), 6, "two triangles should emit six vertices");
    assert_eq!(mesh.indices(), &[0, 1, 2, 3, 4, 5]);
    for vertex in mesh.vertices() {
        assert_eq!(vertex.tex_coords, [0.0, 0.0]);
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
    }
    // Corner 1 appears in both faces and is not merged.
    assert_eq!(mesh.vertices()[0].position, mesh.vertices()[3].position);
    assert_eq!(mesh.vertices()[5].position, [-1.0, 1.0, 0.0]);
    assert!(loaded.warnings.is_empty(), "unexpected warnings: {:?}", loaded.warnings);
}

#[test]
fn test_load_quad_from_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("quad.obj");
    file.write_str(QUAD_OBJ).unwrap();

    let mesh = ModelLoader::load(file.path()).unwrap();
    assert_eq!(mesh.vertices().len(), 6);
    assert_eq!(mesh.indices(), &[0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_triangle_faces_are_never_welded() {
    let cube = IndexedMesh::cube();
    let mut source = String::new();
    for vertex in cube.vertices() {
        let [x, y, z] = vertex.position;
        source.push_str(&format!("v {} {} {}\n", x, y, z));
    }
    for triangle in cube.indices().chunks(3) {
        let [a, b, c] = [triangle[0] + 1, triangle[1] + 1, triangle[2] + 1];
        source.push_str(&format!("f {} {} {}\n", a, b, c));
    }

    let mesh = parse(&source).mesh;
    assert_eq!(mesh.vertices().len(), 3 * 12);
    assert_eq!(mesh.indices(), (0..36).collect::<Vec<u32>>().as_slice());
    for (vertex, &index) in mesh.vertices().iter().zip(cube.indices()) {
        assert_eq!(vertex.position, cube.vertices()[index as usize].position);
    }
}

#[test]
fn test_full_references_look_up_attributes() {
    let loaded = parse(
        "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
         vt 0 0\nvt 1 0\nvt 0 1\n\
         vn 0 1 0\n\
         f 1/1/1 2/2/1 3/3/1\n",
    );
    let vertices = loaded.mesh.vertices();
    assert_eq!(vertices[1].tex_coords, [1.0, 0.0]);
    assert_eq!(vertices[2].tex_coords, [0.0, 1.0]);
    assert!(vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    assert!(loaded.warnings.is_empty());
}

#[test]
fn test_negative_indices_are_relative_to_end() {
    let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").mesh;
    assert_eq!(mesh.vertices()[0].position, [0.0, 0.0, 0.0]);
    assert_eq!(mesh.vertices()[2].position, [0.0, 1.0, 0.0]);
}

#[test_log::test]
fn test_polygon_face_is_fan_triangulated() {
    let loaded = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
    let mesh = &loaded.mesh;

    assert_eq!(mesh.vertices().len(), 6);
    assert_eq!(mesh.indices(), &[0, 1, 2, 3, 4, 5]);
    assert_eq!(mesh.vertices()[3].position, [0.0, 0.0, 0.0]);
    assert_eq!(mesh.vertices()[5].position, [0.0, 1.0, 0.0]);
    assert_eq!(loaded.warnings.len(), 1);
    assert_eq!(loaded.warnings[0].line, Some(5));
    assert!(loaded.warnings[0].message.contains("fan-triangulated"));
}

#[test_log::test]
fn test_partial_references_get_defaults_with_warning() {
    let loaded = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 1 0 0\nf 1//1 2 3\n");
    let vertices = loaded.mesh.vertices();

    assert_eq!(vertices[0].normal, [1.0, 0.0, 0.0]);
    assert_eq!(vertices[1].normal, ModelVertex::DEFAULT_NORMAL);
    assert_eq!(loaded.warnings.len(), 1);
    assert!(loaded.warnings[0].to_string().starts_with("line 5:"));
}

#[test]
fn test_single_component_tex_coord() {
    let loaded = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5\nf 1/1 2/1 3/1\n");
    assert_eq!(loaded.mesh.vertices()[0].tex_coords, [0.5, 0.0]);
    assert_eq!(loaded.warnings.len(), 1);
}

#[test]
fn test_comments_groups_and_unknown_directives() {
    let loaded = parse(
        "o quad\ng side\ns off\nusemtl red\n\
         v 0 0 0 1 0 0\nv 1 0 0\nv 0 1 0 # trailing comment\n\
         curv 0 1 1 2\n\
         f 1 2 3 # tri\n",
    );
    assert_eq!(loaded.mesh.vertices().len(), 3);
    assert_eq!(loaded.warnings.len(), 1, "only the unknown directive warns");
    assert!(loaded.warnings[0].message.contains("curv"));
}

#[test]
fn test_malformed_number_is_parse_error() {
    match parse_err("v 1 x 3\n") {
        LoadError::Parse { line, message } => {
            assert_eq!(line, 1);
            assert!(message.contains("'x'"), "message was {message}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_structural_errors_are_fatal() {
    let cases = [
        ("v 1 2\n", 1),
        ("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 5\n", 4),
        ("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n", 4),
        ("v 0 0 0\nv 1 0 0\nf 1 2\n", 3),
        ("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/2 2 3\n", 4),
        ("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1/1/1 2 3\n", 4),
        ("v 0 0 0\nv 1 0 0\nv 0 1 0\n", 3),
    ];

    for (source, expected_line) in cases {
        match parse_err(source) {
            LoadError::Parse { line, .. } => {
                assert_eq!(line, expected_line, "wrong line for {source:?}")
            }
            other => panic!("expected parse error for {source:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_non_utf8_comment_still_loads() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("latin1.obj");
    file.write_binary(b"v 0 0 0\nv 1 0 0\nv 0 1 0\n# caf\xe9 \xff\xfe\nf 1 2 3\n")
        .unwrap();

    let loaded = ModelLoader::load_with_warnings(file.path()).unwrap();
    assert_eq!(loaded.mesh.vertices().len(), 3);
    assert_eq!(loaded.warnings.len(), 1, "warnings: {:?}", loaded.warnings);
    assert_eq!(loaded.warnings[0].line, None);
    assert!(loaded.warnings[0].message.contains("UTF-8"));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let result = ModelLoader::load(temp.path().join("missing.obj"));
    assert!(matches!(result, Err(LoadError::Io { .. })));
}

#[test]
fn test_malformed_file_aborts_load() {
    let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
    writeln!(file, "v 0 0 0\nf 1 1 one").unwrap();

    let error = ModelLoader::load(file.path()).unwrap_err();
    assert!(error.to_string().starts_with("line 2:"), "got {error}");
}

#[test]
fn test_unsupported_format() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("test.unsupported");
    file.touch().unwrap();

    let result = ModelLoader::load(file.path());
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Unsupported model format"));
    }
}

fn quad_gltf() -> String {
    let positions: [[f32; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];
    let mut bytes = Vec::new();
    for position in positions {
        for component in position {
            bytes.extend_from_slice(&component.to_le_bytes());
        }
    }
    for index in [0u32, 1, 2, 0, 2, 3] {
        bytes.extend_from_slice(&index.to_le_bytes());
    }
    let uri = format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );

    format!(
        r#"{{
            "asset": {{ "version": "2.0" }},
            "buffers": [{{ "byteLength": {len}, "uri": "{uri}" }}],
            "bufferViews": [
                {{ "buffer": 0, "byteOffset": 0, "byteLength": 48 }},
                {{ "buffer": 0, "byteOffset": 48, "byteLength": 24 }}
            ],
            "accessors": [
                {{ "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
                   "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
                {{ "bufferView": 1, "componentType": 5125, "count": 6, "type": "SCALAR" }}
            ],
            "meshes": [{{
                "name": "quad",
                "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}]
            }}]
        }}"#,
        len = bytes.len(),
        uri = uri,
    )
}

#[test]
fn test_load_gltf_expands_indices() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("quad.gltf");
    file.write_str(&quad_gltf()).unwrap();

    let mesh = ModelLoader::load(file.path()).unwrap();
    assert_eq!(mesh.vertices().len(), 6);
    assert_eq!(mesh.indices(), &[0, 1, 2, 3, 4, 5]);
    assert_eq!(mesh.vertices()[3].position, [0.0, 0.0, 0.0]);
    assert_eq!(mesh.vertices()[5].position, [0.0, 1.0, 0.0]);
    assert!(mesh.vertices().iter().all(|v| v.normal == ModelVertex::DEFAULT_NORMAL));
}

#[test]
fn test_indexed_mesh_invariants() {
    let vertex = ModelVertex::new([0.0; 3], None, None);

    assert_eq!(
        IndexedMesh::new(vec![vertex; 3], vec![0, 1]),
        Err(MeshError::IncompleteTriangle(2))
    );
    assert_eq!(
        IndexedMesh::new(vec![vertex; 3], vec![0, 1, 3]),
        Err(MeshError::IndexOutOfRange {
            position: 2,
            index: 3,
            vertex_count: 3
        })
    );
    assert!(IndexedMesh::new(vec![vertex; 3], vec![2, 1, 0]).is_ok());
}

#[test]
fn test_cube_geometry() {
    let cube = IndexedMesh::cube();
    assert_eq!(cube.vertices().len(), 8);
    assert_eq!(cube.triangle_count(), 12);
    assert!(cube.indices().iter().all(|&i| (i as usize) < cube.vertices().len()));
    assert_eq!(cube.vertex_data().len(), 8 * 8);
    assert_eq!(cube.bounds(), Some(([-0.5; 3], [0.5; 3])));
}

#[test]
#[serial]
fn test_mesh_upload() {
    let Some((device, _queue)) = try_create_device() else {
        return;
    };

    let mesh = Mesh::from_indexed(&device, "cube", IndexedMesh::cube());
    assert_eq!(mesh.num_elements(), 36, "Cube should have 36 indices (12 triangles)");
    assert_eq!(mesh.layout().stride(), 32);
}

#[test]
#[serial]
fn test_white_texture() {
    let Some((device, queue)) = try_create_device() else {
        return;
    };

    let texture = Texture::white(&device, &queue);
    assert_eq!(texture.texture.size().width, 1);
    assert_eq!(texture.texture.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
}
