//! WGSL loading and validation
//!
//! Sources are validated with naga before wgpu ever sees them, so a broken
//! edit is reported as an error instead of a device panic. Compute entry
//! points are also checked against the device's workgroup limits, which
//! naga knows nothing about.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Ray-march program shipped with the binary
pub const MARCH_WGSL: &str = include_str!("../../shaders/march.wgsl");
/// Composite program shipped with the binary
pub const DISPLAY_WGSL: &str = include_str!("../../shaders/display.wgsl");

/// Parse and validate `source`, checking that `entry_point` exists for `stage`
/// and fits within `limits`
pub fn validate_wgsl(
    path: &Path,
    source: &str,
    stage: naga::ShaderStage,
    entry_point: &str,
    limits: &wgpu::Limits,
) -> Result<()> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| Error::Shader {
        path: path.to_path_buf(),
        message: e.emit_to_string(source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator.validate(&module).map_err(|e| Error::Shader {
        path: path.to_path_buf(),
        message: e.emit_to_string(source),
    })?;

    let Some(entry) = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == entry_point)
    else {
        return Err(Error::Shader {
            path: path.to_path_buf(),
            message: format!("missing {stage:?} entry point `{entry_point}`"),
        });
    };

    if stage == naga::ShaderStage::Compute {
        check_workgroup_size(entry.workgroup_size, limits).map_err(|message| Error::Shader {
            path: path.to_path_buf(),
            message,
        })?;
    }
    Ok(())
}

fn check_workgroup_size(size: [u32; 3], limits: &wgpu::Limits) -> std::result::Result<(), String> {
    let max = [
        limits.max_compute_workgroup_size_x,
        limits.max_compute_workgroup_size_y,
        limits.max_compute_workgroup_size_z,
    ];
    if size.iter().zip(max).any(|(&n, m)| n > m) {
        return Err(format!("workgroup size {size:?} exceeds device maximum {max:?}"));
    }

    let invocations = size.iter().map(|&n| u64::from(n)).product::<u64>();
    let max_invocations = limits.max_compute_invocations_per_workgroup;
    if invocations > u64::from(max_invocations) {
        return Err(format!(
            "workgroup size {size:?} has {invocations} invocations, device allows {max_invocations}"
        ));
    }
    Ok(())
}

/// Read a shader file
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a shader file, falling back to the embedded copy when it is missing
pub fn read_source_or(path: &Path, embedded: &str) -> String {
    match read_source(path) {
        Ok(source) => source,
        Err(e) => {
            log::warn!("{e}; using built-in shader");
            embedded.to_string()
        }
    }
}

/// A compiled program that only changes on a successful rebuild
#[derive(Debug)]
pub struct ProgramSlot<T> {
    current: Option<T>,
    generation: u32,
}

impl<T> Default for ProgramSlot<T> {
    fn default() -> Self {
        Self {
            current: None,
            generation: 0,
        }
    }
}

impl<T> ProgramSlot<T> {
    pub fn new(program: T) -> Self {
        Self {
            current: Some(program),
            generation: 1,
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Successful builds so far
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Install `build` if it succeeded; on failure log and keep the old program
    pub fn replace(&mut self, build: Result<T>) -> bool {
        match build {
            Ok(program) => {
                self.current = Some(program);
                self.generation += 1;
                true
            }
            Err(e) => {
                log::error!("{e}");
                if self.current.is_some() {
                    log::warn!("keeping previous program (generation {})", self.generation);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_embedded_shaders_validate() {
        validate_wgsl(
            Path::new("march.wgsl"),
            MARCH_WGSL,
            naga::ShaderStage::Compute,
            "main",
            &wgpu::Limits::default(),
        )
        .unwrap();
        validate_wgsl(
            Path::new("display.wgsl"),
            DISPLAY_WGSL,
            naga::ShaderStage::Fragment,
            "fs_main",
            &wgpu::Limits::default(),
        )
        .unwrap();
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = validate_wgsl(
            Path::new("broken.wgsl"),
            "fn main( {",
            naga::ShaderStage::Compute,
            "main",
            &wgpu::Limits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Shader { .. }));
    }

    #[test]
    fn test_missing_entry_point_is_reported() {
        let source = "@compute @workgroup_size(1) fn other() {}";
        let err = validate_wgsl(
            Path::new("other.wgsl"),
            source,
            naga::ShaderStage::Compute,
            "main",
            &wgpu::Limits::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("main"));
    }

    #[test]
    fn test_oversized_workgroup_is_rejected() {
        // 32x32 passes naga but is four times the default invocation limit
        let source = MARCH_WGSL.replace("@workgroup_size(8, 8, 1)", "@workgroup_size(32, 32, 1)");
        assert_ne!(source, MARCH_WGSL);
        let module = naga::front::wgsl::parse_str(&source).unwrap();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap();

        let err = validate_wgsl(
            Path::new("march.wgsl"),
            &source,
            naga::ShaderStage::Compute,
            "main",
            &wgpu::Limits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Shader { .. }));
        assert!(err.to_string().contains("1024 invocations"));
    }

    #[test]
    fn test_workgroup_axis_limit_is_checked() {
        let limits = wgpu::Limits::default();
        assert!(check_workgroup_size([8, 8, 1], &limits).is_ok());
        assert!(check_workgroup_size([256, 1, 1], &limits).is_ok());
        // z is capped at 64 even though 1 * 1 * 128 invocations would fit
        assert!(check_workgroup_size([1, 1, 128], &limits).is_err());
    }

    #[test]
    fn test_missing_file_uses_embedded() {
        let path = PathBuf::from("does/not/exist.wgsl");
        assert!(read_source(&path).is_err());
        assert_eq!(read_source_or(&path, "embedded"), "embedded");
    }

    #[test]
    fn test_failed_build_keeps_previous_program() {
        let mut slot = ProgramSlot::new("v1");
        assert!(!slot.replace(Err(Error::Shader {
            path: PathBuf::from("march.wgsl"),
            message: "bad".into(),
        })));
        assert_eq!(slot.get(), Some(&"v1"));
        assert_eq!(slot.generation(), 1);

        assert!(slot.replace(Ok("v2")));
        assert_eq!(slot.get(), Some(&"v2"));
        assert_eq!(slot.generation(), 2);

        let empty: ProgramSlot<u32> = ProgramSlot::default();
        assert!(empty.get().is_none());
    }
}
