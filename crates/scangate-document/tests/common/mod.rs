// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic photo builders shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::rect::Rect;

pub const PHOTO_WIDTH: u32 = 1200;
pub const PHOTO_HEIGHT: u32 = 900;
pub const CARD_WIDTH: u32 = 800;
pub const CARD_HEIGHT: u32 = 600;

const BACKGROUND: u8 = 80;
const PAPER: u8 = 210;
const INK: u8 = 50;

/// A sheet of paper with ruled "text" lying flat on a darker desk.
///
/// The card sits centred at 800x600; dark 3px lines every 16px stand in
/// for printed text so the page has fine detail for the blur check.
pub fn flat_document() -> GrayImage {
    let mut photo = GrayImage::from_pixel(PHOTO_WIDTH, PHOTO_HEIGHT, Luma([BACKGROUND]));
    let card_x = ((PHOTO_WIDTH - CARD_WIDTH) / 2) as i32;
    let card_y = ((PHOTO_HEIGHT - CARD_HEIGHT) / 2) as i32;
    draw_filled_rect_mut(
        &mut photo,
        Rect::at(card_x, card_y).of_size(CARD_WIDTH, CARD_HEIGHT),
        Luma([PAPER]),
    );

    let inset = 40;
    let mut y = card_y + inset;
    while y + 3 <= card_y + CARD_HEIGHT as i32 - inset {
        draw_filled_rect_mut(
            &mut photo,
            Rect::at(card_x + inset, y).of_size(CARD_WIDTH - 2 * inset as u32, 3),
            Luma([INK]),
        );
        y += 16;
    }
    photo
}

/// The flat document turned by `degrees` about the photo centre.
pub fn rotated_document(degrees: f32) -> GrayImage {
    rotate_about_center(
        &flat_document(),
        degrees.to_radians(),
        Interpolation::Nearest,
        Luma([BACKGROUND]),
    )
}

/// A wall of small dark tiles: sharp and well exposed, but nothing
/// document-sized to find.
pub fn tiled_wall() -> GrayImage {
    let mut photo = GrayImage::from_pixel(PHOTO_WIDTH, PHOTO_HEIGHT, Luma([150]));
    for y in (10..PHOTO_HEIGHT as i32 - 20).step_by(40) {
        for x in (10..PHOTO_WIDTH as i32 - 20).step_by(40) {
            draw_filled_rect_mut(&mut photo, Rect::at(x, y).of_size(20, 20), Luma([30]));
        }
    }
    photo
}

/// Encode as PNG so tests go through the real decode path.
pub fn png_bytes(gray: GrayImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageLuma8(gray)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("PNG encoding of a synthetic image");
    buffer
}
