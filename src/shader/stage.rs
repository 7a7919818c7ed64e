//! Shader stage compilation with tracked validity
//!
//! A stage is parsed and validated on the CPU with naga before anything
//! touches the GPU, so a bad shader fails here with a full diagnostic
//! log instead of a backend panic at pipeline creation. Compilation is
//! all-or-nothing: on failure no stage exists at all.

use std::fmt;

use crate::core::error::Error;

/// Shader stage kind.
///
/// Dispatch is on this tag rather than a type parameter. `Geometry`
/// stages are part of the program contract but have no WGSL form, so
/// compiling one reports a normal compile diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
    Geometry,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => write!(f, "vertex"),
            StageKind::Fragment => write!(f, "fragment"),
            StageKind::Geometry => write!(f, "geometry"),
        }
    }
}

/// Validated module plus the entry point this stage uses.
#[derive(Clone)]
pub(crate) struct StageModule {
    pub module: naga::Module,
    pub entry_point: String,
}

/// A compiled shader stage.
///
/// The handle has three states: it does not exist before a successful
/// compile, is live afterwards, and is destroyed after [`destroy`]
/// (`valid` returns false, further destroys are no-ops).
///
/// [`destroy`]: ShaderStage::destroy
pub struct ShaderStage {
    kind: StageKind,
    inner: Option<StageModule>,
}

impl ShaderStage {
    /// Parse and validate `source` as a stage of the given kind.
    ///
    /// The source must contain an entry point matching `kind`. Any
    /// parse or validation failure carries naga's diagnostic log in
    /// [`Error::ShaderCompile`]; nothing is kept on the error path.
    pub fn compile(source: &str, kind: StageKind) -> Result<Self, Error> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| Error::ShaderCompile(e.emit_to_string(source)))?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| Error::ShaderCompile(e.emit_to_string(source)))?;

        let naga_stage = match kind {
            StageKind::Vertex => naga::ShaderStage::Vertex,
            StageKind::Fragment => naga::ShaderStage::Fragment,
            StageKind::Geometry => {
                return Err(Error::ShaderCompile(
                    "the WGSL front end has no geometry stage".into(),
                ));
            }
        };

        let entry_point = module
            .entry_points
            .iter()
            .find(|ep| ep.stage == naga_stage)
            .map(|ep| ep.name.clone())
            .ok_or_else(|| {
                Error::ShaderCompile(format!("source has no {kind} entry point"))
            })?;

        log::debug!("compiled {kind} stage, entry point `{entry_point}`");
        Ok(Self {
            kind,
            inner: Some(StageModule { module, entry_point }),
        })
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// Whether the stage is live and usable.
    pub fn valid(&self) -> bool {
        self.inner.is_some()
    }

    /// Release the stage. Destroying an already-destroyed stage is a
    /// no-op, never an error.
    pub fn destroy(&mut self) {
        self.inner = None;
    }

    /// Name of the entry point, if the stage is live.
    pub fn entry_point(&self) -> Option<&str> {
        self.inner.as_ref().map(|m| m.entry_point.as_str())
    }

    pub(crate) fn stage_module(&self) -> Option<&StageModule> {
        self.inner.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_VS: &str = r"
        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 1.0);
        }
    ";

    const VALID_FS: &str = r"
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 0.0, 0.0, 1.0);
        }
    ";

    #[test]
    fn test_compile_vertex_stage() {
        let stage = ShaderStage::compile(VALID_VS, StageKind::Vertex).unwrap();
        assert!(stage.valid());
        assert_eq!(stage.kind(), StageKind::Vertex);
        assert_eq!(stage.entry_point(), Some("vs_main"));
    }

    #[test]
    fn test_malformed_source_fails_with_diagnostics() {
        let result = ShaderStage::compile("fn broken( {", StageKind::Vertex);
        match result {
            Err(Error::ShaderCompile(log)) => assert!(!log.is_empty()),
            _ => panic!("expected a ShaderCompile error"),
        }
    }

    #[test]
    fn test_missing_entry_point_of_requested_kind() {
        let result = ShaderStage::compile(VALID_FS, StageKind::Vertex);
        match result {
            Err(Error::ShaderCompile(log)) => assert!(log.contains("vertex")),
            _ => panic!("expected a ShaderCompile error"),
        }
    }

    #[test]
    fn test_geometry_stage_reports_compile_diagnostic() {
        let result = ShaderStage::compile(VALID_VS, StageKind::Geometry);
        assert!(matches!(result, Err(Error::ShaderCompile(_))));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut stage = ShaderStage::compile(VALID_FS, StageKind::Fragment).unwrap();
        assert!(stage.valid());
        stage.destroy();
        assert!(!stage.valid());
        assert_eq!(stage.entry_point(), None);
        // Destroying again is a no-op.
        stage.destroy();
        assert!(!stage.valid());
    }
}
