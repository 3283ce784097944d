//! Per-frame command recording.
//!
//! Binding calls arrive GL style, one at a time, but wgpu wants whole render
//! passes. Draws are captured here with a snapshot of their state and a slot
//! in the frame's uniform ring, then encoded together at present.

use crate::pipeline::PipelineKey;
use orrery_render::{BufferId, CubemapId, FramebufferId, ProgramId, SamplerId, TextureId};

/// Smallest uniform slot; programs without a block still bind one.
pub(crate) const MIN_UNIFORM_SLOT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Window,
    Framebuffer(FramebufferId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextureBinding {
    D2(TextureId, SamplerId),
    Cube(CubemapId, SamplerId),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DrawRecord {
    pub pipeline: PipelineKey,
    pub program: ProgramId,
    pub buffer: BufferId,
    pub uniform_offset: u32,
    pub textures: Option<TextureBinding>,
    pub viewport: (i32, i32, u32, u32),
    pub first: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PassRecord {
    pub target: Target,
    pub clear: Option<[f32; 4]>,
    pub draws: Vec<DrawRecord>,
}

impl PassRecord {
    fn new(target: Target) -> Self {
        Self {
            target,
            clear: None,
            draws: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct FrameRecorder {
    target: Target,
    passes: Vec<PassRecord>,
    uniforms: Vec<u8>,
    alignment: usize,
}

impl FrameRecorder {
    pub(crate) fn new(uniform_alignment: u32) -> Self {
        Self {
            target: Target::Window,
            passes: Vec::new(),
            uniforms: Vec::new(),
            alignment: uniform_alignment.max(1) as usize,
        }
    }

    pub(crate) fn target(&self) -> Target {
        self.target
    }

    /// Later commands go to `target` in a new pass.
    pub(crate) fn set_target(&mut self, target: Target) {
        self.target = target;
        self.passes.push(PassRecord::new(target));
    }

    fn current(&mut self) -> &mut PassRecord {
        let target = self.target;
        if self.passes.last().is_none_or(|pass| pass.target != target) {
            self.passes.push(PassRecord::new(target));
        }
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }

    /// A clear becomes the load op of the current pass, or starts a new pass
    /// once something has been drawn.
    pub(crate) fn clear(&mut self, color: [f32; 4]) {
        let pass = self.current();
        if pass.draws.is_empty() {
            pass.clear = Some(color);
        } else {
            let target = self.target;
            self.passes.push(PassRecord {
                clear: Some(color),
                ..PassRecord::new(target)
            });
        }
    }

    /// Copies a program's uniform block into the ring and returns its offset.
    pub(crate) fn push_uniforms(&mut self, block: &[u8]) -> u32 {
        let offset = self.uniforms.len().next_multiple_of(self.alignment);
        let slot = block.len().max(MIN_UNIFORM_SLOT as usize);
        self.uniforms.resize(offset + slot, 0);
        self.uniforms[offset..offset + block.len()].copy_from_slice(block);
        offset as u32
    }

    pub(crate) fn push_draw(&mut self, draw: DrawRecord) {
        self.current().draws.push(draw);
    }

    /// Hands over the frame and starts the next one on the window.
    pub(crate) fn finish(&mut self) -> (Vec<PassRecord>, Vec<u8>) {
        self.target = Target::Window;
        (
            std::mem::take(&mut self.passes),
            std::mem::take(&mut self.uniforms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::COLOR_FORMAT;
    use crate::pipeline::TargetFormat;
    use orrery_render::{CullMode, FrontFace, LayoutId, PrimitiveTopology};
    use slotmap::SlotMap;

    fn draw(program: ProgramId, buffer: BufferId) -> DrawRecord {
        DrawRecord {
            pipeline: PipelineKey {
                program,
                layout: LayoutId::default(),
                topology: PrimitiveTopology::TriangleList,
                blend: false,
                depth_test: true,
                depth_write: true,
                cull: CullMode::Back,
                front: FrontFace::Cw,
                target: TargetFormat {
                    color: COLOR_FORMAT,
                    color_count: 1,
                    depth: true,
                },
            },
            program,
            buffer,
            uniform_offset: 0,
            textures: None,
            viewport: (0, 0, 320, 180),
            first: 0,
            count: 36,
        }
    }

    fn ids() -> (ProgramId, BufferId, FramebufferId) {
        let mut programs: SlotMap<ProgramId, ()> = SlotMap::with_key();
        let mut buffers: SlotMap<BufferId, ()> = SlotMap::with_key();
        let mut fbs: SlotMap<FramebufferId, ()> = SlotMap::with_key();
        (programs.insert(()), buffers.insert(()), fbs.insert(()))
    }

    #[test]
    fn three_pass_frame_shape() {
        let (program, buffer, fb) = ids();
        let mut frame = FrameRecorder::new(256);

        frame.set_target(Target::Framebuffer(fb));
        frame.clear([0.0, 0.0, 0.0, 1.0]);
        frame.push_draw(draw(program, buffer));
        frame.push_draw(draw(program, buffer));

        frame.set_target(Target::Window);
        frame.clear([0.0, 0.0, 0.0, 1.0]);
        frame.push_draw(draw(program, buffer));
        frame.push_draw(draw(program, buffer));

        let (passes, _) = frame.finish();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].target, Target::Framebuffer(fb));
        assert_eq!(passes[0].clear, Some([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(passes[0].draws.len(), 2);
        assert_eq!(passes[1].target, Target::Window);
        assert_eq!(passes[1].draws.len(), 2);
        assert_eq!(frame.target(), Target::Window);
    }

    #[test]
    fn clear_after_draw_splits_pass() {
        let (program, buffer, _) = ids();
        let mut frame = FrameRecorder::new(256);
        frame.push_draw(draw(program, buffer));
        frame.clear([1.0, 0.0, 0.0, 1.0]);
        frame.push_draw(draw(program, buffer));

        let (passes, _) = frame.finish();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].clear, None);
        assert_eq!(passes[1].clear, Some([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn uniform_slots_are_aligned() {
        let mut frame = FrameRecorder::new(256);
        assert_eq!(frame.push_uniforms(&[1; 64]), 0);
        assert_eq!(frame.push_uniforms(&[]), 256);
        assert_eq!(frame.push_uniforms(&[2; 192]), 512);

        let (_, ring) = frame.finish();
        assert_eq!(ring.len(), 512 + 192);
        assert_eq!(ring[0], 1);
        assert_eq!(ring[64], 0);
        assert_eq!(ring[512], 2);
    }
}
