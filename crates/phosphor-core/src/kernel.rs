/// Blur radius in pixels on each side of the center tap.
pub const KERNEL_RADIUS: usize = 10;
pub const KERNEL_DIAMETER: usize = KERNEL_RADIUS * 2 + 1;

/// Normalized separable blur kernel with weights `exp(-falloff * r^2)`.
pub fn blur_kernel(focus_falloff: f32) -> [f32; KERNEL_DIAMETER] {
    let mut kernel = [0.0f32; KERNEL_DIAMETER];
    let mut sum = 0.0;
    for (k, weight) in kernel.iter_mut().enumerate() {
        let r = k as f32 - KERNEL_RADIUS as f32;
        *weight = (-focus_falloff * r * r).exp();
        sum += *weight;
    }
    for weight in kernel.iter_mut() {
        *weight /= sum;
    }
    kernel
}
