//! SVG export of a [`Scene`].

use std::fmt::Write;

use crate::scene::{GradientStop, Scene, ScenePrimitive, TextAnchor};

const FONT_FAMILY: &str = "Inter, Segoe UI, sans-serif";

pub fn render_svg(scene: &Scene) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w:.0}' height='{h:.0}' viewBox='0 0 {w:.0} {h:.0}' role='img'>",
        w = scene.width,
        h = scene.height,
    );

    for primitive in &scene.primitives {
        match primitive {
            ScenePrimitive::Background {
                width,
                height,
                stops,
            } => {
                write_gradient(&mut svg, *width, stops);
                let _ = writeln!(
                    svg,
                    "  <rect width='{width:.0}' height='{height:.0}' fill='url(#spectrum)'/>"
                );
            }
            ScenePrimitive::Rule {
                from,
                to,
                color,
                width,
                dash,
                ..
            } => {
                let dash_attr = dash
                    .map(|(on, off)| format!(" stroke-dasharray='{on} {off}'"))
                    .unwrap_or_default();
                let _ = writeln!(
                    svg,
                    "  <line x1='{:.2}' y1='{:.2}' x2='{:.2}' y2='{:.2}' stroke='{color}' stroke-width='{width}'{dash_attr}/>",
                    from.x, from.y, to.x, to.y,
                );
            }
            ScenePrimitive::Text {
                at,
                text,
                color,
                size,
                anchor,
            } => {
                let anchor = match anchor {
                    TextAnchor::Start => "start",
                    TextAnchor::Middle => "middle",
                    TextAnchor::End => "end",
                };
                let _ = writeln!(
                    svg,
                    "  <text x='{:.2}' y='{:.2}' fill='{color}' font-family='{FONT_FAMILY}' font-size='{size}' text-anchor='{anchor}'>{}</text>",
                    at.x,
                    at.y,
                    escape_text(text),
                );
            }
            ScenePrimitive::Marker(marker) => {
                let _ = writeln!(
                    svg,
                    "  <circle data-id='{}' cx='{:.2}' cy='{:.2}' r='{}' fill='{}' stroke='{}' stroke-width='{}' opacity='{}'/>",
                    escape_text(marker.entity.as_str()),
                    marker.center.x,
                    marker.center.y,
                    marker.radius,
                    marker.fill,
                    marker.stroke,
                    marker.stroke_width,
                    marker.opacity,
                );
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn write_gradient(svg: &mut String, width: f64, stops: &[GradientStop]) {
    let _ = writeln!(svg, "  <defs>");
    let _ = writeln!(
        svg,
        "    <linearGradient id='spectrum' x1='0' y1='0' x2='1' y2='0'>"
    );
    for stop in stops {
        let offset = if width > 0.0 {
            (stop.x / width * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let _ = writeln!(
            svg,
            "      <stop offset='{offset:.1}%' stop-color='{}'/>",
            stop.color
        );
    }
    let _ = writeln!(svg, "    </linearGradient>");
    let _ = writeln!(svg, "  </defs>");
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
