/// GLSL dialect the sources are compiled as, picked from the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlslVersion {
    Core330,
    Es300,
}

impl GlslVersion {
    /// Lines that must open every shader of this dialect.
    pub fn header(self) -> &'static str {
        match self {
            GlslVersion::Core330 => "#version 330 core\n",
            GlslVersion::Es300 => "#version 300 es\nprecision highp float;\nprecision highp sampler2D;\n",
        }
    }

    /// Whether `gl_PointSize` is gated behind `PROGRAM_POINT_SIZE`, which ES lacks.
    pub fn has_program_point_size(self) -> bool {
        self == GlslVersion::Core330
    }

    /// Complete source for one of the bodies below.
    pub fn source(self, body: &str) -> String {
        format!("{}{}", self.header(), body)
    }
}

// ── Accumulation shaders ────────────────────────────────────────────

pub const ACCUMULATION_VERTEX: &str = r#"
layout(location = 0) in float a_relative_time; // 0..1 from oldest to newest

uniform mat4 u_projection;
uniform float u_cut_point;  // cursor / capacity
uniform sampler2D u_samples; // 1 x N, RG = ch1, ch2

out float v_depth;

void main() {
    float buffer_time = mod(u_cut_point + a_relative_time, 1.0);
    vec2 signal = texture(u_samples, vec2(buffer_time, 0.5)).rg;
    vec4 base_pos = vec4(signal, a_relative_time * 2.0 - 1.0, 1.0);
    vec4 projected = u_projection * base_pos;

    // Pin over-range to the edge and never clip on depth
    gl_Position = vec4(
        clamp(projected.x, -0.999, 0.999),
        clamp(projected.y, -0.999, 0.999),
        0.0,
        projected.w);
    v_depth = (projected.z / projected.w) * 0.5 + 0.5;
    gl_PointSize = 1.0;
}
"#;

pub const ACCUMULATION_FRAGMENT: &str = r#"
in float v_depth;

uniform float u_persistence_gamma;

out vec4 frag_color;

void main() {
    float glow = pow(max(v_depth, 0.0), u_persistence_gamma);
    frag_color = vec4(vec3(glow), 1.0);
}
"#;

// ── Fullscreen quad shader (shared by both blur passes) ─────────────

pub const FULLSCREEN_VERTEX: &str = r#"
layout(location = 0) in vec2 a_pos;
layout(location = 1) in vec2 a_uv;

out vec2 v_uv;

void main() {
    v_uv = a_uv;
    gl_Position = vec4(a_pos, 0.0, 1.0);
}
"#;

// ── Horizontal blur ─────────────────────────────────────────────────

pub const BLUR_FRAGMENT: &str = r#"
const int RADIUS = 10;
const int DIAMETER = RADIUS * 2 + 1;

in vec2 v_uv;

uniform sampler2D u_source;
uniform vec2 u_size;           // source size in pixels
uniform float u_kernel[DIAMETER];

out vec4 frag_color;

void main() {
    vec3 sum = vec3(0.0);
    for (int k = 0; k < DIAMETER; k++) {
        vec2 offset = vec2(float(k - RADIUS), 0.0) / u_size;
        sum += u_kernel[k] * texture(u_source, v_uv + offset).rgb;
    }
    frag_color = vec4(sum, 1.0);
}
"#;

// ── Vertical blur + tone map ────────────────────────────────────────

pub const TONE_MAP_FRAGMENT: &str = r#"
const int RADIUS = 10;
const int DIAMETER = RADIUS * 2 + 1;

in vec2 v_uv;

uniform sampler2D u_source;
uniform vec2 u_size;
uniform float u_kernel[DIAMETER];
uniform float u_intensity;
uniform float u_invgamma;
uniform vec3 u_tint;

out vec4 frag_color;

void main() {
    vec3 sum = vec3(0.0);
    for (int k = 0; k < DIAMETER; k++) {
        vec2 offset = vec2(0.0, float(k - RADIUS)) / u_size;
        sum += u_kernel[k] * texture(u_source, v_uv + offset).rgb;
    }
    frag_color = vec4(pow(u_intensity * sum, vec3(u_invgamma)) * u_tint, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use phosphor_core::KERNEL_RADIUS;

    #[test]
    fn blur_radius_matches_kernel() {
        let decl = format!("const int RADIUS = {};", KERNEL_RADIUS);
        assert!(BLUR_FRAGMENT.contains(&decl));
        assert!(TONE_MAP_FRAGMENT.contains(&decl));
    }

    const ALL: [&str; 5] = [
        ACCUMULATION_VERTEX,
        ACCUMULATION_FRAGMENT,
        FULLSCREEN_VERTEX,
        BLUR_FRAGMENT,
        TONE_MAP_FRAGMENT,
    ];

    #[test]
    fn bodies_leave_the_version_to_the_dialect() {
        for body in ALL {
            assert!(!body.contains("#version"));
            assert!(!body.contains("precision"));
        }
    }

    #[test]
    fn desktop_sources_target_glsl_330() {
        for body in ALL {
            let src = GlslVersion::Core330.source(body);
            assert!(src.starts_with("#version 330 core\n"));
            assert!(src.ends_with(body));
        }
    }

    #[test]
    fn es_sources_declare_float_precision() {
        for body in ALL {
            let src = GlslVersion::Es300.source(body);
            let mut lines = src.lines();
            assert_eq!(lines.next(), Some("#version 300 es"));
            assert_eq!(lines.next(), Some("precision highp float;"));
            assert_eq!(lines.next(), Some("precision highp sampler2D;"));
        }
        assert!(!GlslVersion::Es300.has_program_point_size());
        assert!(GlslVersion::Core330.has_program_point_size());
    }
}
