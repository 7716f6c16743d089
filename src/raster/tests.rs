// src/raster/tests.rs

use super::*;
use test_log::test;

fn build(
    m: u8,
    format: PixelFormat,
    palette: Option<&[Rgb]>,
    width: usize,
    rows: &[&[u8]],
) -> RasterImage {
    let mut builder = RasterBuilder::new(m);
    builder
        .init(format, palette, width, rows.len())
        .expect("init");
    for row in rows {
        builder.put_row(row).expect("row");
    }
    builder.finish().expect("finish");
    builder.into_image().expect("image")
}

fn row(img: &RasterImage, y: usize) -> &[u8] {
    img.row(y).expect("row in range")
}

#[test]
fn strides_round_per_format() {
    assert_eq!(PixelFormat::Monochrome.stride(1), Some(2));
    assert_eq!(PixelFormat::Monochrome.stride(16), Some(2));
    assert_eq!(PixelFormat::Monochrome.stride(17), Some(4));
    assert_eq!(PixelFormat::Grayscale.stride(5), Some(8));
    assert_eq!(PixelFormat::ColorMapped.stride(8), Some(8));
    assert_eq!(PixelFormat::TrueColor.stride(3), Some(12));
    assert_eq!(PixelFormat::TrueColor.stride(5), Some(16));
    assert_eq!(PixelFormat::TrueColor.stride(usize::MAX / 2), None);
    assert_eq!(PixelFormat::Monochrome.stride(usize::MAX), None);
}

#[test]
fn oversized_dimensions_are_refused() {
    let huge = u32::MAX as usize;
    let mut builder = RasterBuilder::new(1);
    assert_eq!(
        builder.init(PixelFormat::TrueColor, None, huge, huge),
        Err(RasterError::TooLarge {
            width: huge,
            height: huge
        })
    );
    let mut builder = RasterBuilder::new(4);
    assert_eq!(
        builder.init(PixelFormat::Grayscale, None, usize::MAX / 2, 1),
        Err(RasterError::TooLarge {
            width: usize::MAX / 2,
            height: 1
        })
    );
    assert_eq!(builder.put_row(&[0]), Err(RasterError::NotInitialized));
}

#[test]
fn rows_outside_the_image_are_none() {
    let img = build(1, PixelFormat::Grayscale, None, 2, &[&[0, 1]]);
    assert_eq!(img.row(0).map(<[u8]>::len), Some(img.stride()));
    assert_eq!(img.row(1), None);
}

#[test]
fn monochrome_at_one_reverses_bits() {
    let img = build(1, PixelFormat::Monochrome, None, 16, &[&[0b1011_0000, 0x01]]);
    assert_eq!(img.stride(), 2);
    assert_eq!(row(&img, 0), &[0b0000_1101, 0x80]);
    assert_eq!(img.bit_depth(), 1);
    assert!(img.palette().is_none());
}

#[test]
fn monochrome_at_two_expands_and_duplicates_rows() {
    let img = build(2, PixelFormat::Monochrome, None, 8, &[&[0b1011_0000], &[0x01]]);
    assert_eq!((img.width(), img.height()), (16, 4));
    assert_eq!(img.stride(), 2);
    assert_eq!(row(&img, 0), &[0b0000_0000, 0b1111_0011]);
    assert_eq!(row(&img, 1), row(&img, 0));
    assert_eq!(row(&img, 2), &[0b1100_0000, 0]);
    assert_eq!(row(&img, 3), row(&img, 2));
}

#[test]
fn monochrome_rows_are_duplicated_for_every_factor() {
    for m in 1..=4u8 {
        let img = build(m, PixelFormat::Monochrome, None, 8, &[&[0x5A], &[0xC3]]);
        let m = usize::from(m);
        for y in 0..2 * m {
            let expected = if y < m { 0x5A } else { 0xC3 };
            let mut reference = vec![0u8; img.stride()];
            bits::scale_mono_row(&[expected], &mut reference, m);
            assert_eq!(row(&img, y), reference.as_slice(), "factor {} row {}", m, y);
        }
    }
}

#[test]
fn truecolor_skips_padding_byte() {
    let data: &[u8] = &[0xEE, 1, 2, 3, 0xEE, 4, 5, 6];
    let img = build(1, PixelFormat::TrueColor, None, 2, &[data]);
    assert_eq!(&row(&img, 0)[..6], &[1, 2, 3, 4, 5, 6]);
    assert_eq!(img.pixel(1, 0), Some(Rgb::new(4, 5, 6)));
    assert_eq!(img.bit_depth(), 24);
}

#[test]
fn truecolor_at_three_replicates_pixels() {
    let data: &[u8] = &[0, 1, 2, 3, 0, 4, 5, 6];
    let img = build(3, PixelFormat::TrueColor, None, 2, &[data]);
    assert_eq!((img.width(), img.height()), (6, 3));
    let expected = [1, 2, 3, 1, 2, 3, 1, 2, 3, 4, 5, 6, 4, 5, 6, 4, 5, 6];
    for y in 0..3 {
        assert_eq!(&row(&img, y)[..18], &expected);
    }
}

#[test]
fn grayscale_copies_and_gets_ramp_palette() {
    let img = build(1, PixelFormat::Grayscale, None, 3, &[&[0, 128, 255]]);
    assert_eq!(&row(&img, 0)[..3], &[0, 128, 255]);
    let palette = img.palette().expect("gray ramp");
    assert_eq!(palette.len(), 256);
    assert_eq!(palette[128], Rgb::gray(128));
    assert_eq!(img.pixel(1, 0), Some(Rgb::gray(128)));
}

#[test]
fn color_mapped_at_two_replicates_indices() {
    let palette = [Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)];
    let img = build(2, PixelFormat::ColorMapped, Some(&palette), 2, &[&[0, 1]]);
    assert_eq!(&row(&img, 0)[..4], &[0, 0, 1, 1]);
    assert_eq!(row(&img, 1), row(&img, 0));
    assert_eq!(img.palette(), Some(&palette[..]));
    assert_eq!(img.pixel(3, 1), Some(Rgb::new(0, 0, 255)));
}

#[test]
fn color_mapped_requires_palette() {
    let mut builder = RasterBuilder::new(1);
    assert_eq!(
        builder.init(PixelFormat::ColorMapped, None, 4, 4),
        Err(RasterError::MissingPalette)
    );
}

#[test]
fn protocol_misuse_is_reported() {
    let mut builder = RasterBuilder::new(1);
    assert_eq!(builder.put_row(&[0]), Err(RasterError::NotInitialized));
    assert_eq!(builder.finish(), Err(RasterError::NotInitialized));
    assert_eq!(
        builder.init(PixelFormat::Grayscale, None, 0, 4),
        Err(RasterError::EmptyImage { width: 0, height: 4 })
    );

    builder.init(PixelFormat::Grayscale, None, 2, 1).expect("init");
    builder.put_row(&[1, 2]).expect("row");
    assert_eq!(
        builder.put_row(&[3, 4]),
        Err(RasterError::TooManyRows { height: 1 })
    );
    builder.finish().expect("finish");
    assert_eq!(builder.finish(), Err(RasterError::AlreadyFinished));
}

#[test]
fn short_image_leaves_remaining_rows_blank() {
    let mut builder = RasterBuilder::new(1);
    builder.init(PixelFormat::Grayscale, None, 2, 3).expect("init");
    builder.put_row(&[9, 9]).expect("row");
    builder.finish().expect("finish");
    let img = builder.into_image().expect("image");
    assert_eq!(&row(&img, 1)[..2], &[0, 0]);
}

#[test]
fn backing_store_is_built_lazily_once() {
    let img = build(1, PixelFormat::Monochrome, None, 8, &[&[0x01]]);
    assert!(!img.is_materialized());
    let first = img.backing_rgba().as_ptr();
    assert!(img.is_materialized());
    assert_eq!(img.backing_rgba().as_ptr(), first);
    assert_eq!(img.backing_rgba().len(), 8);
    // LSB of the source byte is the leftmost pixel.
    assert_eq!(img.backing_rgba()[0], Rgba::opaque(255, 255, 255));
    assert_eq!(img.backing_rgba()[1], Rgba::opaque(0, 0, 0));
}

#[test]
fn builder_clamps_magnification() {
    assert_eq!(RasterBuilder::new(0).magnification(), 1);
    assert_eq!(RasterBuilder::new(9).magnification(), 4);
}
