/// GLSL material functions for each variant.
///
/// Every source defines `material get_material(material_input input)`.
/// Hosts provide `material_input` (surface `st` and `str` coordinates),
/// `material` (`diffuse`, `alpha`, `emission`), `default_material()` and
/// `gamma_correct()`, and declare one uniform per entry of the program's
/// uniform set.

use super::animated_material::{ScrollDirection, WallAxis};

/// Id of the host's default 1x1 white image
pub const DEFAULT_IMAGE: &str = "builtin:default";

/// Id of the built-in horizontal alpha ramp used by trails
pub const TRAIL_RAMP_IMAGE: &str = "builtin:trail-ramp";

/// Width of the built-in trail ramp
pub const TRAIL_RAMP_WIDTH: usize = 256;

/// RGBA8 pixels of the trail ramp: white, alpha 0 at the left edge rising
/// linearly to 255 at the right edge, one row.
pub fn trail_ramp_rgba() -> Vec<u8> {
    let mut pixels = Vec::with_capacity(TRAIL_RAMP_WIDTH * 4);
    for x in 0..TRAIL_RAMP_WIDTH {
        let alpha = (x as f64 / (TRAIL_RAMP_WIDTH - 1) as f64 * 255.0).round() as u8;
        pixels.extend_from_slice(&[255, 255, 255, alpha]);
    }
    pixels
}

pub const CIRCLE_GRADIENT: &str = r#"
material get_material(material_input input) {
    material m = default_material(input);
    m.diffuse = color.rgb;
    float dis = distance(input.st, vec2(0.5, 0.5));
    float alpha = 1.0 - smoothstep(0.0, 0.5, dis);
    m.alpha = color.a * alpha;
    return m;
}
"#;

pub const CIRCLE_WAVE: &str = r#"
material get_material(material_input input) {
    material m = default_material(input);
    m.diffuse = 1.5 * color.rgb;
    float dis = distance(input.st, vec2(0.5, 0.5));
    float per = fract(time);
    if (abs(input.str.z) > 0.001 || dis > 0.5) {
        discard;
    }
    float ring = 0.5 / count;
    float level = 0.0;
    for (int i = 0; i <= 9; i++) {
        if (float(i) <= count) {
            float d = ring * float(i) - dis + per / count;
            if (d > 0.0) {
                if (d < ring) {
                    level = 1.0 - d / ring;
                } else if (d - ring < ring) {
                    level = 1.0 - abs(1.0 - d / ring);
                }
                m.alpha = pow(level, gradient);
            }
        }
    }
    return m;
}
"#;

pub const ELLIPSOID_FADE: &str = r#"
material get_material(material_input input) {
    material m = default_material(input);
    m.diffuse = 1.5 * color.rgb;
    float dis = distance(input.st, vec2(0.5, 0.5));
    float per = fract(time);
    if (dis > per * 0.5) {
        discard;
    }
    m.alpha = color.a * dis / per;
    return m;
}
"#;

pub const POLYLINE_TRAIL: &str = r#"
material get_material(material_input input) {
    material m = default_material(input);
    vec4 sampled = texture(image, vec2(fract(input.st.s - time), input.st.t));
    m.alpha = sampled.a * color.a;
    m.diffuse = (sampled.rgb + color.rgb) / 2.0;
    return m;
}
"#;

/// Scrolling wall source. Axis, direction and repeat count are baked in.
pub fn dynamic_wall(axis: WallAxis, direction: ScrollDirection, count: f64) -> String {
    let sign = direction.sign();
    let lookup = match axis {
        WallAxis::Vertical => {
            format!("vec2(fract(input.st.s), fract(float({count}) * input.st.t {sign} time))")
        }
        WallAxis::Horizontal => {
            format!("vec2(fract(float({count}) * input.st.s {sign} time), fract(input.st.t))")
        }
    };

    format!(
        r#"
material get_material(material_input input) {{
    material m = default_material(input);
    vec4 sampled = texture(image, {lookup});
    vec4 glow;
    glow.rgb = sampled.rgb + color.rgb;
    glow = gamma_correct(glow);
    m.diffuse = sampled.rgb;
    m.alpha = sampled.a;
    m.emission = glow.rgb;
    return m;
}}
"#
    )
}
