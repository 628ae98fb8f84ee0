use std::path::Path;

/// Writes axis-aligned detections as PaddleOCR-style lines.
pub fn write_detections(
    path: &Path,
    items: &[(f64, f64, f64, f64, &str, f64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let lines = items
        .iter()
        .map(|&(x, y, width, height, text, confidence)| {
            serde_json::json!([
                [[x, y], [x + width, y], [x + width, y + height], [x, y + height]],
                [text, confidence]
            ])
        })
        .collect::<Vec<_>>();

    std::fs::write(path, serde_json::to_string_pretty(&lines)?)?;
    Ok(())
}

pub fn invoice_layout() -> Vec<(f64, f64, f64, f64, &'static str, f64)> {
    vec![
        (10.0, 10.0, 90.0, 20.0, "Item", 0.95),
        (210.0, 12.0, 60.0, 20.0, "Qty", 0.9),
        (410.0, 9.0, 80.0, 20.0, "Price", 0.93),
        (10.0, 60.0, 70.0, 20.0, "Pen", 0.88),
        (210.0, 61.0, 20.0, 20.0, "3", 0.8),
        (410.0, 59.0, 60.0, 20.0, "1,50", 0.85),
    ]
}
