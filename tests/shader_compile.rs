use std::fs;
use std::path::{Path, PathBuf};

use split_march::consts::WORKGROUP_SIZE;
use split_march::renderer::gpu_types::{FrameUniform, PlayersUniform, ViewUniform};
use split_march::renderer::shader::{DISPLAY_WGSL, MARCH_WGSL, validate_wgsl};
use split_march::sim::view::BACKGROUND;

fn shader_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders").join(name)
}

// Parse and validate a WGSL file with naga, panicking with the rendered report
fn parse_shader(name: &str) -> (String, naga::Module) {
    let path = shader_path(name);
    let source = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => panic!("Failed to read shader file {path:?}: {e}"),
    };

    let module = match naga::front::wgsl::parse_str(&source) {
        Ok(m) => m,
        Err(e) => panic!(
            "WGSL parsing error in {path:?}:\n{error_report}",
            error_report = e.emit_to_string(&source)
        ),
    };

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    if let Err(e) = validator.validate(&module) {
        panic!(
            "WGSL validation error in {path:?}:\n{error_report}",
            error_report = e.emit_to_string(&source)
        );
    }
    (source, module)
}

fn struct_size(module: &naga::Module, name: &str) -> u32 {
    module
        .types
        .iter()
        .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
            (Some(n), naga::TypeInner::Struct { span, .. }) if n == name => Some(*span),
            _ => None,
        })
        .unwrap_or_else(|| panic!("struct {name} not found"))
}

#[test]
fn validate_march_shader_compiles() {
    let (_, module) = parse_shader("march.wgsl");
    let main = module
        .entry_points
        .iter()
        .find(|ep| ep.name == "main")
        .expect("compute entry point");
    assert_eq!(main.stage, naga::ShaderStage::Compute);
    assert_eq!(main.workgroup_size, [WORKGROUP_SIZE, WORKGROUP_SIZE, 1]);
}

#[test]
fn validate_display_shader_compiles() {
    let (_, module) = parse_shader("display.wgsl");
    let stages: Vec<_> = module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect();
    assert!(stages.contains(&("vs_main", naga::ShaderStage::Vertex)));
    assert!(stages.contains(&("fs_main", naga::ShaderStage::Fragment)));
}

#[test]
fn uniform_structs_match_host_layout() {
    let (_, module) = parse_shader("march.wgsl");
    assert_eq!(
        struct_size(&module, "FrameData") as usize,
        std::mem::size_of::<FrameUniform>()
    );
    assert_eq!(
        struct_size(&module, "Players") as usize,
        std::mem::size_of::<PlayersUniform>()
    );
    assert_eq!(
        struct_size(&module, "ViewData") as usize,
        std::mem::size_of::<ViewUniform>()
    );
}

#[test]
fn embedded_copies_match_files_on_disk() {
    let (march, _) = parse_shader("march.wgsl");
    let (display, _) = parse_shader("display.wgsl");
    assert_eq!(march, MARCH_WGSL);
    assert_eq!(display, DISPLAY_WGSL);
}

#[test]
fn shaders_share_background_colour() {
    let declaration = format!(
        "const BACKGROUND: vec3<f32> = vec3<f32>({:?}, {:?}, {:?});",
        BACKGROUND.x, BACKGROUND.y, BACKGROUND.z
    );
    // Uncovered cells in the composite must match rays that miss in the march
    assert!(MARCH_WGSL.contains(&declaration));
    assert!(DISPLAY_WGSL.contains(&declaration));
}

#[test]
fn broken_shader_is_reported_not_panicked() {
    let err = validate_wgsl(
        Path::new("broken.wgsl"),
        "@compute @workgroup_size(8, 8, 1) fn main() { let x: f32 = ; }",
        naga::ShaderStage::Compute,
        "main",
        &wgpu::Limits::default(),
    )
    .unwrap_err();
    assert!(!err.is_fatal());
    assert!(err.to_string().contains("broken.wgsl"));
}
