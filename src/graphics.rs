use macroquad::prelude::*;
use runner_evo::simulation::render::RenderItem;
use runner_evo::simulation::vector::Vector;

fn texture_color(item: &RenderItem) -> Color {
    match item.texture.as_ref().map(|t| t.0.as_str()) {
        Some("dino" | "dino_duck") => Color::from_rgba(83, 83, 83, 255),
        Some("cactus") => Color::from_rgba(40, 140, 60, 255),
        Some("bird") => Color::from_rgba(150, 70, 50, 255),
        Some("floor") => Color::from_rgba(200, 190, 170, 255),
        _ => GRAY,
    }
}

/// World position of `p` relative to the camera, in screen pixels.
fn to_screen(p: Vector, camera: Vector) -> (f32, f32) {
    (
        (p.x - camera.x) as f32 + screen_width() / 2.0,
        (p.y - camera.y) as f32 + screen_height() / 2.0,
    )
}

pub fn draw_items(items: &[RenderItem], camera: Vector) {
    // items arrive sorted by z-index
    for item in items {
        let (x, y) = to_screen(item.position, camera);
        let (w, h) = (item.size.x as f32, item.size.y as f32);
        draw_rectangle(x - w / 2.0, y - h / 2.0, w, h, texture_color(item));
    }
}

pub fn draw_status(lines: &[String]) {
    let font_size = 20.0;
    for (i, line) in lines.iter().enumerate() {
        draw_text(line, 10.0, 24.0 + i as f32 * font_size, font_size, DARKGRAY);
    }
}
