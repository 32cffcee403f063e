//! End-to-end tests driving the public API: build sources, edit fields,
//! write every format, and read the results back from disk.

use imagesink::{
    BufferFormat, Compression, CsvOptions, Image, PixelLayout, PngOptions, Quality, Writer,
    META_EXIF, META_ICC,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn gradient_image(width: u32, height: u32) -> Image {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 4 % 256) as u8);
            data.push((y * 5 % 256) as u8);
            data.push(((x + y) % 256) as u8);
        }
    }
    Image::from_pixels(width, height, PixelLayout::Rgb8, data).unwrap()
}

fn jpeg_fixture(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    Writer::new(&gradient_image(64, 48))
        .unwrap()
        .write_jpeg(&path, Quality(90))
        .unwrap();
    path
}

#[test]
fn exif_and_icc_survive_a_jpeg_round_trip() {
    let tmp = TempDir::new().unwrap();
    let source = Image::open(jpeg_fixture(tmp.path(), "source.jpg")).unwrap();

    let exif = b"II*\0\x08\0\0\0camera-data".to_vec();
    // Large enough that embedding must split it across two APP2 segments.
    let icc = vec![0xAB; 70_000];

    let mut writer = Writer::new(&source).unwrap();
    writer.set_exif(exif.clone()).unwrap();
    writer.set_icc_profile(icc.clone()).unwrap();

    let out = tmp.path().join("tagged.jpg");
    writer.write_jpeg(&out, Quality(85)).unwrap();

    let reopened = Image::open(&out).unwrap();
    assert_eq!(reopened.metadata(META_EXIF), Some(exif.as_slice()));
    assert_eq!(reopened.metadata(META_ICC), Some(icc.as_slice()));
}

#[test]
fn png_output_does_not_carry_fields() {
    let tmp = TempDir::new().unwrap();
    let mut writer = Writer::new(&gradient_image(16, 16)).unwrap();
    writer.set_exif(&b"II*\0"[..]).unwrap();

    let out = tmp.path().join("plain.png");
    writer.write_png(&out, PngOptions::default()).unwrap();

    let reopened = Image::open(&out).unwrap();
    assert!(!reopened.has_metadata(META_EXIF));
}

#[test]
fn buffer_and_file_output_are_the_same_bytes() {
    let tmp = TempDir::new().unwrap();
    let writer = Writer::new(&gradient_image(32, 32)).unwrap();

    let out = tmp.path().join("twin.jpg");
    writer.write_jpeg(&out, Quality(60)).unwrap();
    let from_file = std::fs::read(&out).unwrap();
    let from_buffer = writer.jpeg_buffer(Quality(60)).unwrap();
    assert_eq!(from_file, from_buffer);
}

#[test]
fn buffers_carry_their_container_signatures() {
    let writer = Writer::new(&gradient_image(8, 8)).unwrap();

    let jpeg = writer.jpeg_buffer(Quality::default()).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let png = writer.png_buffer(PngOptions::default()).unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);
}

#[test]
fn interlaced_png_output_is_refused() {
    let writer = Writer::new(&gradient_image(8, 8)).unwrap();
    let err = writer
        .encode_to_buffer(BufferFormat::Png(PngOptions {
            compression: Compression::default(),
            interlaced: true,
        }))
        .unwrap_err();
    assert!(err.to_string().contains("interlaced"));
}

#[test]
fn failed_writes_leave_nothing_behind() {
    let tmp = TempDir::new().unwrap();
    let writer = Writer::new(&gradient_image(8, 8)).unwrap();

    let out = tmp.path().join("no-such-dir").join("out.jpg");
    let err = writer.write_jpeg(&out, Quality::default()).unwrap_err();
    assert!(err.to_string().contains("cannot write"));
    assert!(!out.exists());
}

#[test]
fn corrupt_pixel_data_fails_at_writer_construction() {
    let png = Writer::new(&gradient_image(20, 20))
        .unwrap()
        .png_buffer(PngOptions::default())
        .unwrap();

    // Cut the stream tail: headers still probe, pixels no longer decode.
    let img = Image::from_memory(png[..png.len() - 20].to_vec()).unwrap();
    assert_eq!((img.width(), img.height()), (20, 20));
    assert!(Writer::new(&img).is_err());
}

#[test]
fn tiff_round_trip_keeps_dimensions() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("copy.tiff");
    Writer::new(&gradient_image(40, 25))
        .unwrap()
        .write_tiff(&out)
        .unwrap();

    let reopened = Image::open(&out).unwrap();
    assert_eq!(reopened.format(), "tiff");
    assert_eq!((reopened.width(), reopened.height()), (40, 25));
}

#[test]
fn ppm_picks_its_magic_from_the_band_count() {
    let tmp = TempDir::new().unwrap();

    let gray = Image::from_pixels(4, 4, PixelLayout::Gray8, vec![7; 16]).unwrap();
    let gray_out = tmp.path().join("gray.ppm");
    Writer::new(&gray).unwrap().write_ppm(&gray_out).unwrap();
    assert_eq!(&std::fs::read(&gray_out).unwrap()[..2], b"P5");

    let rgb_out = tmp.path().join("rgb.ppm");
    Writer::new(&gradient_image(4, 4))
        .unwrap()
        .write_ppm(&rgb_out)
        .unwrap();
    assert_eq!(&std::fs::read(&rgb_out).unwrap()[..2], b"P6");
}

#[test]
fn csv_dumps_samples_with_the_chosen_separator() {
    let tmp = TempDir::new().unwrap();
    let img = Image::from_pixels(2, 2, PixelLayout::Gray8, vec![1, 2, 3, 4]).unwrap();
    let writer = Writer::new(&img).unwrap();

    let tabbed = tmp.path().join("samples.csv");
    writer.write_csv(&tabbed, CsvOptions::default()).unwrap();
    assert_eq!(std::fs::read(&tabbed).unwrap(), b"1\t2\n3\t4\n");

    let commas = tmp.path().join("commas.csv");
    writer
        .write_csv(&commas, CsvOptions { separator: ',' })
        .unwrap();
    assert_eq!(std::fs::read(&commas).unwrap(), b"1,2\n3,4\n");
}

#[test]
fn write_dispatches_on_the_file_extension() {
    let tmp = TempDir::new().unwrap();
    let writer = Writer::new(&gradient_image(8, 8)).unwrap();

    let out = tmp.path().join("picked.png");
    writer.write(&out).unwrap();
    assert_eq!(&std::fs::read(&out).unwrap()[..8], &PNG_SIGNATURE);

    let err = writer.write(tmp.path().join("report.txt")).unwrap_err();
    assert!(err.to_string().contains("unsupported output format"));

    assert!(writer.write(tmp.path().join("no_extension")).is_err());
}

#[test]
fn file_writes_chain() {
    let tmp = TempDir::new().unwrap();
    let jpeg = tmp.path().join("chain.jpg");
    let tiff = tmp.path().join("chain.tif");

    Writer::new(&gradient_image(10, 10))
        .unwrap()
        .write_jpeg(&jpeg, Quality::default())
        .unwrap()
        .write_tiff(&tiff)
        .unwrap();

    assert!(jpeg.exists());
    assert!(tiff.exists());
}

#[test]
fn buffers_reopen_as_images() {
    let writer = Writer::new(&gradient_image(24, 18)).unwrap();
    let png = writer.png_buffer(PngOptions::default()).unwrap();

    let reopened = Image::from_memory(png).unwrap();
    assert_eq!(reopened.format(), "png");
    assert_eq!((reopened.width(), reopened.height()), (24, 18));

    // PNG is lossless, so a second pass reproduces the exact bytes.
    let second = Writer::new(&reopened)
        .unwrap()
        .png_buffer(PngOptions::default())
        .unwrap();
    let first = writer.png_buffer(PngOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn a_source_outlives_its_writers() {
    let img = gradient_image(16, 16);
    {
        let writer = Writer::new(&img).unwrap();
        writer.jpeg_buffer(Quality::default()).unwrap();
        assert_eq!(writer.image(), &img);
    }
    let again = Writer::new(&img).unwrap();
    assert_eq!((again.width(), again.height()), (16, 16));
}
