use image::Rgba;
use overlay_fx::{
    ColorImage, FrameGate, MaskBuilder, PresentationMode, RenderRequest,
    SegmentationOverlayPipeline, StyleKind, SubmitOutcome, Viewport,
};
use std::sync::Arc;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const CLEARED: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn close(a: Rgba<u8>, b: [u8; 4]) -> bool {
    a.0.iter().zip(b).all(|(&x, y)| x.abs_diff(y) <= 1)
}

#[test]
fn sepia_background_scaled_to_viewport() {
    let labels = [0u8, 1, 0, 1];
    let source = ColorImage::from_pixel(2, 2, RED);

    let mask = MaskBuilder::build(&labels, 2, 2).unwrap();
    assert!(mask.is_opaque(0, 0));
    assert!(!mask.is_opaque(1, 0));
    assert!(mask.is_opaque(0, 1));
    assert!(!mask.is_opaque(1, 1));

    let mut pipeline = SegmentationOverlayPipeline::default();
    let result = pipeline
        .render(
            Some(&source),
            &labels,
            2,
            2,
            Viewport::new(4, 4),
            PresentationMode::Image,
            StyleKind::Sepia,
        )
        .unwrap()
        .unwrap();

    assert_eq!((result.width, result.height), (4, 4));
    assert_eq!(result.image.dimensions(), (4, 4));

    for y in 0..4 {
        for x in 0..4 {
            let pixel = *result.image.get_pixel(x, y);
            if x < 2 {
                // primary segment, cut away
                assert_eq!(pixel, CLEARED, "({x}, {y})");
            } else {
                // red background, desaturated and warmed
                assert!(close(pixel, [76, 69, 59, 255]), "({x}, {y}) = {pixel:?}");
            }
        }
    }

    assert_eq!(pipeline.current(), Some(result));
}

#[test]
fn blurred_background_keeps_cut_region_clear_of_colour() {
    let width = 64;
    let height = 8;
    let labels: Vec<u8> = (0..width * height)
        .map(|i| if i % width < 8 { 0 } else { 15 })
        .collect();
    let source = ColorImage::from_fn(width, height, |x, _| {
        if x % 2 == 0 {
            Rgba([200, 200, 200, 255])
        } else {
            Rgba([100, 100, 100, 255])
        }
    });

    let mut pipeline = SegmentationOverlayPipeline::default();
    let result = pipeline
        .render(
            Some(&source),
            &labels,
            width,
            height,
            Viewport::new(width, height),
            PresentationMode::Video,
            StyleKind::blur(10.0).unwrap(),
        )
        .unwrap()
        .unwrap();

    // far from the cut, alternating columns are smoothed towards their mean
    let p = result.image.get_pixel(40, 4);
    assert_eq!(p[3], 255);
    assert!((140..=160).contains(&p[0]), "{p:?}");

    // alpha fades in across the cut edge
    assert!(result.image.get_pixel(7, 4)[3] < result.image.get_pixel(8, 4)[3]);
}

#[test]
fn absent_source_and_mismatch_are_soft_skips() {
    let mut pipeline = SegmentationOverlayPipeline::default();
    let viewport = Viewport::new(10, 10);

    let none = pipeline
        .render(None, &[0; 4], 2, 2, viewport, PresentationMode::LiveStream, StyleKind::Grayscale)
        .unwrap();
    assert!(none.is_none());

    let source = ColorImage::from_pixel(3, 3, RED);
    let mismatch = pipeline
        .render(Some(&source), &[0; 4], 2, 2, viewport, PresentationMode::LiveStream, StyleKind::Grayscale)
        .unwrap();
    assert!(mismatch.is_none());
    assert!(pipeline.current().is_none());
}

#[test]
fn concurrent_submitters_never_tear_results() {
    let gate = Arc::new(FrameGate::new(SegmentationOverlayPipeline::default()));

    let handles: Vec<_> = (1..=4u32)
        .map(|t| {
            let gate = Arc::clone(&gate);
            std::thread::spawn(move || {
                let mut rendered = 0;
                for i in 0..25u32 {
                    let side = 2 + (t * 25 + i) % 30;
                    let request = RenderRequest {
                        source: Some(ColorImage::from_pixel(4, 2, RED)),
                        labels: vec![1, 0, 1, 0, 1, 0, 1, 0],
                        label_width: 4,
                        label_height: 2,
                        viewport: Viewport::new(side * 2, side),
                        mode: PresentationMode::Image,
                        style: StyleKind::Sepia,
                    };
                    if let SubmitOutcome::Rendered { frames } = gate.submit(request).unwrap() {
                        rendered += frames;
                    }

                    if let Some(latest) = gate.latest() {
                        assert_eq!(latest.image.dimensions(), (latest.width, latest.height));
                        assert_eq!(latest.width, latest.height * 2);
                    }
                }
                rendered
            })
        })
        .collect();

    let rendered: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert!(rendered >= 1 && rendered <= 100);

    let latest = gate.latest().unwrap();
    assert_eq!(latest.sequence as usize, rendered);
}
