use crate::enrichment::{EnrichedHost, HostTable};
use crate::logging::ColorMode;
use crate::perps::PerpsTable;
use owo_colors::{OwoColorize, Style};
use std::fmt::Write;

fn paint(text: &str, style: Style, mode: ColorMode) -> String {
    match mode {
        ColorMode::Color => text.style(style).to_string(),
        ColorMode::Plain => text.to_string(),
    }
}

/// Render the report: for each address in `order`, its enrichment data followed
/// by its raw log entries.
pub fn render_report(
    order: &[String],
    hosts: &HostTable,
    perps: &PerpsTable,
    mode: ColorMode,
) -> String {
    let mut out = String::new();

    for address in order {
        out.push_str("\n+++++++++\n");
        let _ = writeln!(out, "---->  {address}");

        match hosts.get(address) {
            Some(host) => render_host(&mut out, host, mode),
            None => out.push_str(&paint("*No enrichment data\n", Style::new().red(), mode)),
        }

        out.push_str("....\n");
        for entry in perps.get(address).unwrap_or_default() {
            let _ = writeln!(out, "*: {entry}");
        }
    }

    out
}

fn render_host(out: &mut String, host: &EnrichedHost, mode: ColorMode) {
    let cyan = Style::new().cyan();
    let yellow = Style::new().yellow();

    out.push_str(&paint(
        &format!("*Hostname: {}\n", host.display_hostname()),
        cyan,
        mode,
    ));

    let Some(geo) = &host.geo else {
        return;
    };

    if !host.hostname.is_empty() && !geo.hostname.is_empty() && geo.hostname != host.hostname {
        out.push_str(&paint(&format!("*Geo hostname: {}\n", geo.hostname), cyan, mode));
    }

    out.push_str(&paint(
        &format!("*Country Code: {}\n", geo.country_code),
        yellow,
        mode,
    ));
    out.push_str(&paint(&geo.to_string(), cyan, mode));
}
