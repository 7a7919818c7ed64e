//! Shader program linking and name/location reflection
//!
//! Linking checks the vertex→fragment interface up front (the backend
//! would otherwise fail at pipeline creation with a less helpful
//! message) and exposes memoized attribute and uniform lookups by name.
//! Absence of a name is a normal outcome for optional shader inputs,
//! reported as `None` rather than an error.

use std::collections::HashMap;

use crate::core::error::Error;
use crate::shader::stage::{ShaderStage, StageKind, StageModule};

/// A uniform's resource binding slot (bind group and binding index).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformBinding {
    pub group: u32,
    pub binding: u32,
}

/// Scalar/vector shape of an interface variable, comparable across
/// independently parsed modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct VaryingType {
    kind: naga::ScalarKind,
    width: u8,
    components: u8,
}

/// One user-defined interface variable: location, name, shape.
struct InterfaceVar {
    location: u32,
    name: Option<String>,
    ty: VaryingType,
}

struct LinkedProgram {
    vertex: StageModule,
    fragment: StageModule,
    // Carried for lifecycle symmetry; no WGSL geometry stage can
    // currently compile, so this slot links as absent.
    #[allow(dead_code)]
    geometry: Option<StageModule>,
}

/// A linked shader program with cached name→location lookups.
///
/// Lifecycle follows the stage handles: live after a successful link,
/// destroyed (and cache cleared) after [`destroy`]; destroying twice is
/// a no-op. The input stages stay owned by the caller.
///
/// [`destroy`]: ShaderProgram::destroy
pub struct ShaderProgram {
    inner: Option<LinkedProgram>,
    attribute_cache: HashMap<String, u32>,
    uniform_cache: HashMap<String, UniformBinding>,
}

impl ShaderProgram {
    /// Link a vertex and fragment stage, with an optional geometry
    /// stage, into a program.
    ///
    /// Every fragment input location must be fed by a vertex output of
    /// the same shape; any mismatch fails with [`Error::ShaderLink`]
    /// carrying the diagnostic, and no program is left live.
    pub fn link(
        vs: &ShaderStage,
        fs: &ShaderStage,
        gs: Option<&ShaderStage>,
    ) -> Result<Self, Error> {
        if vs.kind() != StageKind::Vertex {
            return Err(Error::ShaderLink(format!(
                "first stage must be a vertex stage, got {}",
                vs.kind()
            )));
        }
        if fs.kind() != StageKind::Fragment {
            return Err(Error::ShaderLink(format!(
                "second stage must be a fragment stage, got {}",
                fs.kind()
            )));
        }

        let vertex = vs
            .stage_module()
            .ok_or_else(|| Error::ShaderLink("vertex stage is not valid".into()))?;
        let fragment = fs
            .stage_module()
            .ok_or_else(|| Error::ShaderLink("fragment stage is not valid".into()))?;

        // The geometry slot is optional; every check is conditioned on
        // its presence.
        let geometry = match gs {
            Some(g) => {
                if g.kind() != StageKind::Geometry {
                    return Err(Error::ShaderLink(format!(
                        "third stage must be a geometry stage, got {}",
                        g.kind()
                    )));
                }
                let module = g
                    .stage_module()
                    .ok_or_else(|| Error::ShaderLink("geometry stage is not valid".into()))?;
                Some(module.clone())
            }
            None => None,
        };

        check_interface(vertex, fragment)?;

        log::debug!(
            "linked program: `{}` -> `{}`{}",
            vertex.entry_point,
            fragment.entry_point,
            if geometry.is_some() { " (with geometry stage)" } else { "" }
        );

        Ok(Self {
            inner: Some(LinkedProgram {
                vertex: vertex.clone(),
                fragment: fragment.clone(),
                geometry,
            }),
            attribute_cache: HashMap::new(),
            uniform_cache: HashMap::new(),
        })
    }

    /// Whether the program is live and usable.
    pub fn valid(&self) -> bool {
        self.inner.is_some()
    }

    /// Release the program and clear the location caches. Destroying an
    /// already-destroyed program is a no-op.
    pub fn destroy(&mut self) {
        self.inner = None;
        self.attribute_cache.clear();
        self.uniform_cache.clear();
    }

    /// Shader location of a named vertex attribute, or `None` if the
    /// vertex stage has no such input. Successful lookups are memoized.
    pub fn get_attribute(&mut self, name: &str) -> Option<u32> {
        if let Some(&location) = self.attribute_cache.get(name) {
            return Some(location);
        }
        let program = self.inner.as_ref()?;
        let location = entry_inputs(&program.vertex)
            .into_iter()
            .find(|var| var.name.as_deref() == Some(name))
            .map(|var| var.location)?;
        self.attribute_cache.insert(name.to_owned(), location);
        Some(location)
    }

    /// Bind group and binding of a named uniform (uniform buffer,
    /// texture, or sampler global), or `None` if no stage declares it.
    /// Successful lookups are memoized.
    pub fn get_uniform(&mut self, name: &str) -> Option<UniformBinding> {
        if let Some(&binding) = self.uniform_cache.get(name) {
            return Some(binding);
        }
        let program = self.inner.as_ref()?;
        let binding = find_global(&program.vertex.module, name)
            .or_else(|| find_global(&program.fragment.module, name))?;
        self.uniform_cache.insert(name.to_owned(), binding);
        Some(binding)
    }

    pub fn has_attribute(&mut self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn has_uniform(&mut self, name: &str) -> bool {
        self.get_uniform(name).is_some()
    }
}

/// Resolve a named module-level resource to its binding slot.
fn find_global(module: &naga::Module, name: &str) -> Option<UniformBinding> {
    module.global_variables.iter().find_map(|(_, var)| {
        if var.name.as_deref() == Some(name) {
            var.binding.as_ref().map(|b| UniformBinding {
                group: b.group,
                binding: b.binding,
            })
        } else {
            None
        }
    })
}

fn varying_type(module: &naga::Module, ty: naga::Handle<naga::Type>) -> Option<VaryingType> {
    match &module.types[ty].inner {
        naga::TypeInner::Scalar(s) => Some(VaryingType {
            kind: s.kind,
            width: s.width,
            components: 1,
        }),
        naga::TypeInner::Vector { size, scalar } => Some(VaryingType {
            kind: scalar.kind,
            width: scalar.width,
            components: *size as u8,
        }),
        _ => None,
    }
}

/// User-defined (non-builtin) inputs of a stage's entry point, flattened
/// through input structs.
fn entry_inputs(stage: &StageModule) -> Vec<InterfaceVar> {
    let mut vars = Vec::new();
    let Some(entry) = stage
        .module
        .entry_points
        .iter()
        .find(|ep| ep.name == stage.entry_point)
    else {
        return vars;
    };

    for arg in &entry.function.arguments {
        match &arg.binding {
            Some(naga::Binding::Location { location, .. }) => {
                if let Some(ty) = varying_type(&stage.module, arg.ty) {
                    vars.push(InterfaceVar {
                        location: *location,
                        name: arg.name.clone(),
                        ty,
                    });
                }
            }
            Some(naga::Binding::BuiltIn(_)) => {}
            None => collect_struct_io(&stage.module, arg.ty, &mut vars),
        }
    }
    vars
}

/// User-defined outputs of a stage's entry point.
fn entry_outputs(stage: &StageModule) -> Vec<InterfaceVar> {
    let mut vars = Vec::new();
    let Some(entry) = stage
        .module
        .entry_points
        .iter()
        .find(|ep| ep.name == stage.entry_point)
    else {
        return vars;
    };

    if let Some(result) = &entry.function.result {
        match &result.binding {
            Some(naga::Binding::Location { location, .. }) => {
                if let Some(ty) = varying_type(&stage.module, result.ty) {
                    vars.push(InterfaceVar {
                        location: *location,
                        name: None,
                        ty,
                    });
                }
            }
            Some(naga::Binding::BuiltIn(_)) => {}
            None => collect_struct_io(&stage.module, result.ty, &mut vars),
        }
    }
    vars
}

fn collect_struct_io(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    vars: &mut Vec<InterfaceVar>,
) {
    if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
        for member in members {
            if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                if let Some(ty) = varying_type(module, member.ty) {
                    vars.push(InterfaceVar {
                        location: *location,
                        name: member.name.clone(),
                        ty,
                    });
                }
            }
        }
    }
}

/// Require every fragment input to be fed by a vertex output with a
/// matching shape at the same location.
fn check_interface(vertex: &StageModule, fragment: &StageModule) -> Result<(), Error> {
    let outputs = entry_outputs(vertex);
    for input in entry_inputs(fragment) {
        let name = input.name.as_deref().unwrap_or("<unnamed>");
        let Some(output) = outputs.iter().find(|o| o.location == input.location) else {
            return Err(Error::ShaderLink(format!(
                "fragment input `{name}` at location {} has no matching vertex output",
                input.location
            )));
        };
        if output.ty != input.ty {
            return Err(Error::ShaderLink(format!(
                "fragment input `{name}` at location {} does not match the vertex output type",
                input.location
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADER: &str = r"
        struct Uniforms {
            tint: vec4<f32>,
        }

        @group(0) @binding(0) var<uniform> uniforms: Uniforms;
        @group(0) @binding(1) var base_texture: texture_2d<f32>;
        @group(0) @binding(2) var base_sampler: sampler;

        struct VsOut {
            @builtin(position) clip: vec4<f32>,
            @location(0) uv: vec2<f32>,
        }

        @vertex
        fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
            var out: VsOut;
            out.clip = vec4<f32>(position, 1.0);
            out.uv = uv;
            return out;
        }

        @fragment
        fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
            return textureSample(base_texture, base_sampler, in.uv) * uniforms.tint;
        }
    ";

    // Fragment expecting a varying the vertex stage never writes.
    const MISMATCHED_FS: &str = r"
        @fragment
        fn fs_main(@location(3) missing: vec4<f32>) -> @location(0) vec4<f32> {
            return missing;
        }
    ";

    fn stages() -> (ShaderStage, ShaderStage) {
        (
            ShaderStage::compile(SHADER, StageKind::Vertex).unwrap(),
            ShaderStage::compile(SHADER, StageKind::Fragment).unwrap(),
        )
    }

    #[test]
    fn test_link_and_reflect() {
        let (vs, fs) = stages();
        let mut program = ShaderProgram::link(&vs, &fs, None).unwrap();
        assert!(program.valid());
        // Stages stay caller-owned and live after a successful link.
        assert!(vs.valid() && fs.valid());

        assert_eq!(program.get_attribute("position"), Some(0));
        assert_eq!(program.get_attribute("uv"), Some(1));
        assert_eq!(
            program.get_uniform("uniforms"),
            Some(UniformBinding { group: 0, binding: 0 })
        );
        assert_eq!(
            program.get_uniform("base_sampler"),
            Some(UniformBinding { group: 0, binding: 2 })
        );
    }

    #[test]
    fn test_absent_names_are_a_sentinel_not_an_error() {
        let (vs, fs) = stages();
        let mut program = ShaderProgram::link(&vs, &fs, None).unwrap();
        // Absence is an expected outcome for optional inputs; repeated
        // lookups keep returning the sentinel.
        assert_eq!(program.get_attribute("tangent"), None);
        assert_eq!(program.get_attribute("tangent"), None);
        assert!(!program.has_uniform("shadow_map"));
    }

    #[test]
    fn test_cached_lookup_is_stable() {
        let (vs, fs) = stages();
        let mut program = ShaderProgram::link(&vs, &fs, None).unwrap();
        let first = program.get_attribute("position");
        let second = program.get_attribute("position");
        assert_eq!(first, second);
    }

    #[test]
    fn test_interface_mismatch_fails_link() {
        let vs = ShaderStage::compile(SHADER, StageKind::Vertex).unwrap();
        let fs = ShaderStage::compile(MISMATCHED_FS, StageKind::Fragment).unwrap();
        match ShaderProgram::link(&vs, &fs, None) {
            Err(Error::ShaderLink(log)) => assert!(log.contains("location 3")),
            _ => panic!("expected a ShaderLink error"),
        }
    }

    #[test]
    fn test_wrong_stage_kind_fails_link() {
        let (vs, fs) = stages();
        assert!(matches!(
            ShaderProgram::link(&fs, &vs, None),
            Err(Error::ShaderLink(_))
        ));
    }

    #[test]
    fn test_destroyed_stage_fails_link() {
        let (mut vs, fs) = stages();
        vs.destroy();
        assert!(matches!(
            ShaderProgram::link(&vs, &fs, None),
            Err(Error::ShaderLink(_))
        ));
    }

    #[test]
    fn test_destroy_clears_cache_and_is_idempotent() {
        let (vs, fs) = stages();
        let mut program = ShaderProgram::link(&vs, &fs, None).unwrap();
        assert_eq!(program.get_attribute("position"), Some(0));

        program.destroy();
        assert!(!program.valid());
        assert_eq!(program.get_attribute("position"), None);
        assert_eq!(program.get_uniform("uniforms"), None);

        // Destroying again is a no-op.
        program.destroy();
        assert!(!program.valid());
    }
}
