//! Static renditions of a built scene for the offline run.

use serde::Serialize;
use spectracore::layout::spectrum::TextAnchor;
use spectracore::layout::{BandStyle, MapScene, SpectrumScene};
use std::fmt::Write;

fn anchor_attr(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn stroke_attrs(style: &BandStyle) -> String {
    let mut attrs = match style.stroke {
        Some(color) => format!(
            r#" stroke="{}" stroke-width="{:.3}""#,
            color, style.stroke_width
        ),
        None => r#" stroke="none""#.to_string(),
    };
    if let Some([dash, gap]) = style.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{dash},{gap}""#);
    }
    attrs
}

/// SVG markup for the spectrum chart, in its current styles.
pub fn render_spectrum_svg(scene: &SpectrumScene) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = scene.width,
        h = scene.height
    );

    svg.push_str(r#"<defs><linearGradient id="grad" x1="0%" y1="100%" x2="0%" y2="0%">"#);
    for stop in &scene.bar.stops {
        let _ = write!(
            svg,
            r#"<stop offset="{:.2}%" stop-color="{}"/>"#,
            stop.offset * 100.0,
            stop.color
        );
    }
    svg.push_str("</linearGradient></defs>\n");

    let bar = &scene.bar;
    let _ = writeln!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="url(#grad)" opacity="{}" stroke="{}" stroke-width="{}"/>"#,
        bar.rect.x,
        bar.rect.y,
        bar.rect.width,
        bar.rect.height,
        bar.opacity,
        bar.stroke,
        bar.stroke_width,
        r = bar.corner_radius,
    );

    for label in &scene.range_labels {
        let _ = writeln!(
            svg,
            r##"<text x="{}" y="{}" dy="0.35em" text-anchor="{}" font-size="13" font-weight="500" fill="#555">{}</text>"##,
            label.position.x,
            label.position.y,
            anchor_attr(label.anchor),
            label.text
        );
    }
    for caption in [&scene.top_caption, &scene.bottom_caption] {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="{}">{}</text>"#,
            caption.position.x,
            caption.position.y,
            anchor_attr(caption.anchor),
            caption.text
        );
    }

    for band in &scene.bands {
        let _ = writeln!(
            svg,
            r#"<rect class="{class}" data-id="{id}" x="{x}" y="{y:.3}" width="{w}" height="{h:.3}" rx="{r}" ry="{r}" fill="{fill}" opacity="{opacity:.3}"{stroke}><title>{title}</title></rect>"#,
            class = if band.is_weak { "range-weak" } else { "range" },
            id = band.id,
            x = band.rect.x,
            y = band.rect.y,
            w = band.rect.width,
            h = band.rect.height,
            r = band.corner_radius,
            fill = band.fill,
            opacity = band.style.opacity,
            stroke = stroke_attrs(&band.style),
            title = band.tooltip,
        );
    }

    svg.push_str("</svg>\n");
    svg
}

#[derive(Debug, Serialize)]
struct MarkerRow<'a> {
    id: &'a str,
    lat: f64,
    lng: f64,
    shifted: bool,
    fill: String,
}

/// Marker list as pretty JSON, in draw order.
pub fn render_markers_json(scene: &MapScene) -> serde_json::Result<String> {
    let rows = scene
        .draw_order()
        .map(|marker| MarkerRow {
            id: marker.id.as_str(),
            lat: marker.position.lat,
            lng: marker.position.lng,
            shifted: marker.position != marker.original,
            fill: marker.fill.to_string(),
        })
        .collect::<Vec<_>>();
    serde_json::to_string_pretty(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectracore::dataset::Dataset;
    use spectracore::i18n::{Catalog, Locale};
    use spectracore::{LayoutConfig, Scene};

    fn scene() -> Scene {
        let dataset = Dataset::from_json_str(
            r#"{ "data": [
                { "ids": { "keychip": "K1", "main": "M1" }, "lat": 23.7, "lng": 121,
                  "nickname": "One", "ranges": [ { "min": 40, "max": 60 } ],
                  "weakRanges": [ { "min": 70, "max": 75 } ] },
                { "ids": { "keychip": "K2", "main": "M2" }, "lat": 23.7, "lng": 121,
                  "nickname": "Two", "ranges": [ { "min": 5, "max": 8 } ] }
            ] }"#,
        )
        .unwrap();
        Scene::build(
            &dataset,
            &Catalog::empty(),
            &Locale::default(),
            &LayoutConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn svg_contains_every_band() {
        let svg = render_spectrum_svg(&scene().spectrum);
        assert_eq!(svg.matches(r#"class="range""#).count(), 2);
        assert_eq!(svg.matches(r#"class="range-weak""#).count(), 1);
        assert!(svg.contains(r#"stroke-dasharray="2,2""#));
        assert!(svg.contains("Freely傾向"));
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn markers_json_flags_shifted_markers() {
        let json = render_markers_json(&scene().map).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(rows[0]["shifted"], false);
        assert_eq!(rows[1]["shifted"], true);
        assert_eq!(rows[1]["id"], "K2/M2");
    }
}
