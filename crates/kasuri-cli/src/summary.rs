use std::path::Path;

use console::Style;
use kasuri_core::geometry::Corner;
use kasuri_core::session::Session;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_session_summary(session: &Session, session_path: &Path) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Kasuri Session"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(14)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Session"),
        s.path.apply_to(session_path.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Image"),
        s.path.apply_to(&session.image)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Version"),
        s.value.apply_to(session.version)
    );
    println!();

    println!("  {}", s.header.apply_to("Calibration"));
    for corner in Corner::ALL {
        let p = session.quad.corner(corner);
        println!(
            "    {:<14}{}",
            s.label.apply_to(corner),
            s.value.apply_to(format!("({:.4}, {:.4})", p.x, p.y))
        );
    }
    match session.quad.aspect_ratio() {
        Some(ratio) => println!(
            "    {:<14}{}",
            s.label.apply_to("Aspect"),
            s.value.apply_to(format!("{ratio:.3}"))
        ),
        None => println!(
            "    {:<14}{}",
            s.label.apply_to("Aspect"),
            s.disabled.apply_to("degenerate")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Grid"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Rows"),
        s.value.apply_to(session.grid.rows())
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Columns"),
        s.value.apply_to(session.grid.cols())
    );
    println!();

    if session.markers.is_empty() {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Markers"),
            s.disabled.apply_to("none")
        );
    } else {
        println!("  {}", s.header.apply_to("Markers"));
        println!(
            "    {:<6}{:<8}{:<8}{}",
            s.label.apply_to("#"),
            s.label.apply_to("Row"),
            s.label.apply_to("Col"),
            s.label.apply_to("Position")
        );
        for (i, m) in session.markers.iter().enumerate() {
            println!(
                "    {:<6}{:<8}{:<8}({:.4}, {:.4})",
                s.label.apply_to(i + 1),
                s.value.apply_to(m.row_index),
                s.value.apply_to(m.col_index),
                m.normalized_x,
                m.normalized_y
            );
        }
    }
    println!();
}
