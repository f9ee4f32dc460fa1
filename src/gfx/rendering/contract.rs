//! Startup check that each shader declares exactly the bind slots the CPU
//! side binds
//!
//! A mismatch between a shader's `@group(g) @binding(b)` declarations and
//! the bind group layouts would otherwise only show up as a validation error
//! at the first draw. Sources are parsed with naga, so commented-out
//! declarations and undecorated functions do not count.

use naga::{ResourceBinding, ShaderStage};

use crate::error::SetupError;

/// Bind slots and entry points a shader must declare.
#[derive(Debug, Clone, Copy)]
pub struct ShaderContract {
    pub shader: &'static str,
    /// (group, binding) pairs, in any order.
    pub bindings: &'static [(u32, u32)],
    pub entry_points: &'static [(&'static str, ShaderStage)],
}

const VERTEX_FRAGMENT: &[(&str, ShaderStage)] = &[
    ("vs_main", ShaderStage::Vertex),
    ("fs_main", ShaderStage::Fragment),
];

pub const RENDER: ShaderContract = ShaderContract {
    shader: "render",
    bindings: &[
        (0, 0),
        (0, 1),
        (0, 2),
        (0, 3),
        (0, 4),
        (0, 5),
        (1, 0),
        (2, 0),
        (2, 1),
        (2, 2),
        (2, 3),
    ],
    entry_points: VERTEX_FRAGMENT,
};

pub const SHADOW: ShaderContract = ShaderContract {
    shader: "shadow",
    bindings: &[(0, 0), (1, 0)],
    entry_points: VERTEX_FRAGMENT,
};

pub const POST_PROCESS: ShaderContract = ShaderContract {
    shader: "post_process",
    bindings: &[(0, 0), (0, 1), (0, 2)],
    entry_points: VERTEX_FRAGMENT,
};

impl ShaderContract {
    pub fn verify(&self, source: &str) -> Result<(), SetupError> {
        let violation = |reason: String| SetupError::ShaderContract {
            shader: self.shader.to_string(),
            reason,
        };

        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| violation(format!("WGSL parse error: {}", e.emit_to_string(source))))?;

        let mut declared = declared_bindings(&module);
        declared.sort_unstable();
        if let Some(pair) = declared.windows(2).find(|w| w[0] == w[1]) {
            return Err(violation(format!(
                "@group({}) @binding({}) is declared twice",
                pair[0].0, pair[0].1
            )));
        }

        let mut expected = self.bindings.to_vec();
        expected.sort_unstable();
        if let Some((group, binding)) = expected.iter().find(|slot| !declared.contains(slot)) {
            return Err(violation(format!("missing @group({group}) @binding({binding})")));
        }
        if let Some((group, binding)) = declared.iter().find(|slot| !expected.contains(slot)) {
            return Err(violation(format!("unexpected @group({group}) @binding({binding})")));
        }

        for (name, stage) in self.entry_points {
            match module.entry_points.iter().find(|ep| ep.name == *name) {
                Some(ep) if ep.stage == *stage => {}
                Some(ep) => {
                    return Err(violation(format!(
                        "entry point '{name}' is a {:?} stage, expected {:?}",
                        ep.stage, stage
                    )))
                }
                None => return Err(violation(format!("{stage:?} entry point '{name}' not found"))),
            }
        }
        Ok(())
    }
}

/// Every `(group, binding)` pair attached to a global, in declaration order.
pub fn declared_bindings(module: &naga::Module) -> Vec<(u32, u32)> {
    module
        .global_variables
        .iter()
        .filter_map(|(_, var)| var.binding.as_ref())
        .map(|ResourceBinding { group, binding }| (*group, *binding))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADOW_SOURCE: &str = include_str!("shadow.wgsl");
    const RENDER_SOURCE: &str = include_str!("render.wgsl");
    const POST_SOURCE: &str = include_str!("post_process.wgsl");

    const STAGES: &str = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }\n\
                          @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }\n";

    fn parse(source: &str) -> naga::Module {
        naga::front::wgsl::parse_str(source).unwrap()
    }

    #[test]
    fn test_bundled_shaders_satisfy_contracts() {
        RENDER.verify(RENDER_SOURCE).unwrap();
        SHADOW.verify(SHADOW_SOURCE).unwrap();
        POST_PROCESS.verify(POST_SOURCE).unwrap();
    }

    #[test]
    fn test_bindings_come_from_parsed_globals() {
        let source = format!(
            "// @group(9) @binding(9) var<uniform> old: f32;\n\
             /* @group(8) @binding(8) var<uniform> older: f32; */\n\
             @group(0)  @binding(0) var<uniform> a: f32;\n\
             @group(1)\n@binding(0) var<uniform> b: f32;\n{STAGES}"
        );
        assert_eq!(declared_bindings(&parse(&source)), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_block_commented_binding_is_missing() {
        let source = format!(
            "@group(0) @binding(0) var<uniform> o: f32;\n\
             /* @group(1) @binding(0) var<uniform> s: f32; */\n{STAGES}"
        );
        let err = SHADOW.verify(&source).unwrap_err();
        assert!(err.to_string().contains("missing @group(1) @binding(0)"));
    }

    #[test]
    fn test_missing_and_extra_slots_are_reported() {
        let missing = format!("@group(0) @binding(0) var<uniform> o: f32;\n{STAGES}");
        let err = SHADOW.verify(&missing).unwrap_err();
        assert!(err.to_string().contains("missing @group(1) @binding(0)"));

        let extra = format!(
            "@group(0) @binding(0) var<uniform> o: f32;\n\
             @group(1) @binding(0) var<uniform> s: f32;\n\
             @group(1) @binding(1) var<uniform> x: f32;\n{STAGES}"
        );
        let err = SHADOW.verify(&extra).unwrap_err();
        assert!(err.to_string().contains("unexpected @group(1) @binding(1)"));
    }

    #[test]
    fn test_undecorated_functions_are_not_entry_points() {
        let source = "@group(0) @binding(0) var<uniform> o: f32;\n\
                      @group(1) @binding(0) var<uniform> s: f32;\n\
                      fn vs_main() {}\nfn fs_main() {}";
        let err = SHADOW.verify(source).unwrap_err();
        assert!(matches!(err, SetupError::ShaderContract { .. }));
        assert!(err.to_string().contains("vs_main"));
    }

    #[test]
    fn test_wrong_stage_is_reported() {
        let source = "@group(0) @binding(0) var<uniform> o: f32;\n\
                      @group(1) @binding(0) var<uniform> s: f32;\n\
                      @vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }\n\
                      @vertex fn fs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }\n";
        let err = SHADOW.verify(source).unwrap_err();
        assert!(err.to_string().contains("'fs_main' is a Vertex stage"));
    }

    #[test]
    fn test_parse_error_is_a_contract_violation() {
        let err = SHADOW.verify("@group(0) @binding(0) var<uniform> o: ;").unwrap_err();
        assert!(matches!(err, SetupError::ShaderContract { .. }));
        assert!(err.to_string().contains("WGSL parse error"));
    }
}
