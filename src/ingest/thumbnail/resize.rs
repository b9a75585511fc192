//! 纯 CPU 的解码、缩放、编码辅助函数（在 spawn_blocking 中调用）

use std::io::Cursor;

use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Delay, DynamicImage, Frame, RgbaImage};

use crate::blob::{EncodedArtifact, encode_counted};
use crate::errors::{MacrodexError, Result};

/// 等比缩放：长边缩放到 `edge`，短边四舍五入且至少 1 像素
pub fn scaled_dimensions(width: u32, height: u32, edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (edge, edge);
    }

    if width >= height {
        let h = (height as f64 * edge as f64 / width as f64).round() as u32;
        (edge, h.max(1))
    } else {
        let w = (width as f64 * edge as f64 / height as f64).round() as u32;
        (w.max(1), edge)
    }
}

/// 最近邻缩放
pub fn resize_to_edge(image: &RgbaImage, edge: u32) -> RgbaImage {
    let (w, h) = scaled_dimensions(image.width(), image.height(), edge);
    imageops::resize(image, w, h, FilterType::Nearest)
}

/// 编码为 JPEG（丢弃 alpha）
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<EncodedArtifact> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    encode_counted(|w| {
        JpegEncoder::new_with_quality(w, quality).encode_image(&rgb)?;
        Ok(())
    })
}

/// 解码静态图片并生成 JPEG 缩略图，返回 (缩略图, 原图宽, 原图高)
pub fn still_thumbnail(bytes: &[u8], edge: u32, quality: u8) -> Result<(EncodedArtifact, u32, u32)> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = (decoded.width(), decoded.height());
    let resized = resize_to_edge(&decoded.to_rgba8(), edge);
    Ok((encode_jpeg(&resized, quality)?, width, height))
}

/// GIF 的一帧原始数据（RGBA，帧自身矩形内）
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    /// 单位：1/100 秒
    pub delay: u16,
    pub dispose: gif::DisposalMethod,
    pub rgba: Vec<u8>,
}

impl RawFrame {
    fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.rgba.clone()).ok_or_else(|| {
            MacrodexError::permanent_content("gif frame buffer does not match its rectangle")
        })
    }
}

/// 解码后的动图
#[derive(Debug, Clone)]
pub struct DecodedAnimation {
    pub frames: Vec<RawFrame>,
    pub width: u32,
    pub height: u32,
}

/// 解码全部帧
///
/// 画布取所有帧矩形与原点 (0,0) 的并集包围盒。
pub fn decode_gif(bytes: &[u8]) -> Result<DecodedAnimation> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);

    let mut decoder = options
        .read_info(Cursor::new(bytes))
        .map_err(|e| MacrodexError::permanent_content(format!("gif decode failed: {}", e)))?;

    let mut frames = Vec::new();
    let (mut width, mut height) = (0u32, 0u32);

    while let Some(frame) = decoder
        .read_next_frame()
        .map_err(|e| MacrodexError::permanent_content(format!("gif frame decode failed: {}", e)))?
    {
        let raw = RawFrame {
            left: u32::from(frame.left),
            top: u32::from(frame.top),
            width: u32::from(frame.width),
            height: u32::from(frame.height),
            delay: frame.delay,
            dispose: frame.dispose,
            rgba: frame.buffer.to_vec(),
        };
        width = width.max(raw.left + raw.width);
        height = height.max(raw.top + raw.height);
        frames.push(raw);
    }

    if frames.is_empty() || width == 0 || height == 0 {
        return Err(MacrodexError::permanent_content("gif contains zero images"));
    }

    Ok(DecodedAnimation {
        frames,
        width,
        height,
    })
}

/// 第一帧绘制到包围盒画布上
pub fn composite_first_frame(animation: &DecodedAnimation) -> Result<RgbaImage> {
    let mut canvas = RgbaImage::new(animation.width, animation.height);
    let first = &animation.frames[0];
    imageops::overlay(
        &mut canvas,
        &first.to_image()?,
        i64::from(first.left),
        i64::from(first.top),
    );
    Ok(canvas)
}

/// 按帧依次合成完整画面（处理 disposal），每帧缩放后重新编码为 GIF，保留帧延迟
pub fn reencode_gif(animation: &DecodedAnimation, edge: u32) -> Result<EncodedArtifact> {
    let mut canvas = RgbaImage::new(animation.width, animation.height);
    let mut frames = Vec::with_capacity(animation.frames.len());

    for raw in &animation.frames {
        let previous = match raw.dispose {
            gif::DisposalMethod::Previous => Some(canvas.clone()),
            _ => None,
        };

        imageops::overlay(
            &mut canvas,
            &raw.to_image()?,
            i64::from(raw.left),
            i64::from(raw.top),
        );

        let resized = resize_to_edge(&canvas, edge);
        let delay = Delay::from_numer_denom_ms(u32::from(raw.delay) * 10, 1);
        frames.push(Frame::from_parts(resized, 0, 0, delay));

        match raw.dispose {
            gif::DisposalMethod::Background => {
                clear_rect(&mut canvas, raw);
            }
            gif::DisposalMethod::Previous => {
                if let Some(previous) = previous {
                    canvas = previous;
                }
            }
            _ => {}
        }
    }

    encode_counted(|w| {
        let mut encoder = GifEncoder::new(w);
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(frames)?;
        Ok(())
    })
}

fn clear_rect(canvas: &mut RgbaImage, frame: &RawFrame) {
    let right = (frame.left + frame.width).min(canvas.width());
    let bottom = (frame.top + frame.height).min(canvas.height());
    for y in frame.top..bottom {
        for x in frame.left..right {
            canvas.put_pixel(x, y, image::Rgba([0, 0, 0, 0]));
        }
    }
}
