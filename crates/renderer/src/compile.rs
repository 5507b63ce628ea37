use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the overlay mesh vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("overlay vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the wipe fragment shader.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("overlay wipe fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

const VERTEX_SHADER_GLSL: &str = concat!(
    "#version 450\n",
    r#"
layout(set = 0, binding = 0) uniform TransitionUniforms {
    mat4 uTransform;
    vec4 uOverlayColor;
    vec2 uResolution;
    float uProgress;
    float uPower;
    uint uOut;
};

layout(location = 0) in vec3 position;
layout(location = 1) in vec2 uv;

layout(location = 0) out vec2 vUv;

void main() {
    vUv = uv;
    gl_Position = uTransform * vec4(position, 1.0);
}
"#
);

const FRAGMENT_SHADER_GLSL: &str = concat!(
    "#version 450\n",
    r#"
layout(set = 0, binding = 0) uniform TransitionUniforms {
    mat4 uTransform;
    vec4 uOverlayColor;
    vec2 uResolution;
    float uProgress;
    float uPower;
    uint uOut;
};

layout(location = 0) in vec2 vUv;
layout(location = 0) out vec4 outColor;

const float PI = 3.14159265;
const float BEND = 0.35;

void main() {
    // Resting overlay grows from the bottom; while it hides, it retreats
    // towards the top instead.
    float along = uOut == 1u ? vUv.y : 1.0 - vUv.y;

    float bulge = sin(vUv.x * PI) * uPower * BEND;
    float edge = mix(-BEND, 1.0 + BEND, uProgress) + bulge;

    float soft = max(fwidth(along), 1.0 / max(uResolution.y, 1.0));
    float coverage = 1.0 - smoothstep(edge - soft, edge + soft, along);

    float alpha = uOverlayColor.a * coverage;
    outColor = vec4(uOverlayColor.rgb * alpha, alpha);
}
"#
);

#[cfg(test)]
mod tests {
    use super::*;

    // Mirrors `TransitionUniforms`.
    const UNIFORM_BLOCK_GLSL: &str = r#"
layout(set = 0, binding = 0) uniform TransitionUniforms {
    mat4 uTransform;
    vec4 uOverlayColor;
    vec2 uResolution;
    float uProgress;
    float uPower;
    uint uOut;
};
"#;

    #[test]
    fn stages_share_the_uniform_block() {
        let block = UNIFORM_BLOCK_GLSL.trim();
        assert!(VERTEX_SHADER_GLSL.contains(block));
        assert!(FRAGMENT_SHADER_GLSL.contains(block));
    }

    #[test]
    fn shaders_parse_with_naga() {
        let mut frontend = wgpu::naga::front::glsl::Frontend::default();
        for (source, stage) in [
            (VERTEX_SHADER_GLSL, ShaderStage::Vertex),
            (FRAGMENT_SHADER_GLSL, ShaderStage::Fragment),
        ] {
            let options = wgpu::naga::front::glsl::Options::from(stage);
            frontend
                .parse(&options, source)
                .unwrap_or_else(|err| panic!("{stage:?} shader failed to parse: {err:?}"));
        }
    }
}
