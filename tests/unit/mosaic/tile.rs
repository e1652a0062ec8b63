use super::*;
use crate::foundation::core::Canvas;

fn checker(width: u32, height: u32) -> Arc<SourceFrame> {
    let mut data = Vec::new();
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[x as u8, y as u8, 100, 255]);
        }
    }
    Arc::new(SourceFrame::from_premul(width, height, data).unwrap())
}

#[test]
fn render_without_buffer_is_silent() {
    let tile = Tile::new(Point::new(0.0, 0.0), Size::new(2.0, 2.0), None);
    let mut target = FrameRGBA::filled(Canvas::new(2, 2), [1, 1, 1, 1]);
    let before = target.clone();
    tile.render(&mut target);
    assert_eq!(target, before);
}

#[test]
fn render_copies_from_sample_offset_to_position() {
    let mut tile = Tile::new(Point::new(2.0, 0.0), Size::new(2.0, 2.0), Some(checker(10, 10)));
    tile.set_sample_offset(7, 3);
    let mut target = FrameRGBA::filled(Canvas::new(4, 2), [0, 0, 0, 0]);
    tile.render(&mut target);
    assert_eq!(target.pixel(2, 0), Some([7, 3, 100, 255]));
    assert_eq!(target.pixel(3, 1), Some([8, 4, 100, 255]));
    assert_eq!(target.pixel(1, 0), Some([0, 0, 0, 0]));
}

#[test]
fn set_buffer_keeps_sample_offset() {
    let mut tile = Tile::new(Point::ZERO, Size::new(1.0, 1.0), Some(checker(4, 4)));
    tile.set_sample_offset(2, 1);
    tile.set_buffer(Some(checker(8, 8)));
    assert_eq!(tile.sample_offset(), SampleOffset::new(2, 1));
    assert_eq!(tile.buffer().map(|b| b.width), Some(8));
}

#[test]
fn fractional_tiles_share_edges() {
    let w = 100.0 / 3.0;
    let a = Tile::new(Point::new(0.0, 0.0), Size::new(w, 10.0), None).pixel_rect();
    let b = Tile::new(Point::new(w, 0.0), Size::new(w, 10.0), None).pixel_rect();
    let c = Tile::new(Point::new(2.0 * w, 0.0), Size::new(w, 10.0), None).pixel_rect();
    assert_eq!(a.x + i64::from(a.width), b.x);
    assert_eq!(b.x + i64::from(b.width), c.x);
    assert_eq!(c.x + i64::from(c.width), 100);
}
