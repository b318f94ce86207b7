//! Shared component styles and the callout palette.
//!
//! Everything here is identical in both layouts and sized in `em`/`rem`
//! so the configured base font size scales the whole document. Nothing in
//! this file may force a page break.

use folio_core::CalloutKind;

/// Component CSS shared by paged and continuous layouts.
pub const BASE_CSS: &str = r#"*,*::before,*::after{box-sizing:border-box;}
body{margin:0;font-family:"Noto Sans","Helvetica Neue",Arial,sans-serif;line-height:1.6;color:#1f2328;background:#ffffff;}
.gw-container h1,.gw-container h2,.gw-container h3,.gw-container h4,.gw-container h5,.gw-container h6{line-height:1.25;margin:1.5em 0 0.5em;font-weight:600;}
.gw-container h1{font-size:2em;border-bottom:1px solid #d8dee4;padding-bottom:0.3em;}
.gw-container h2{font-size:1.5em;border-bottom:1px solid #d8dee4;padding-bottom:0.3em;}
.gw-container h3{font-size:1.25em;}
.gw-container h4{font-size:1em;}
.gw-container h5{font-size:0.875em;}
.gw-container h6{font-size:0.85em;color:#59636e;}
.gw-heading-anchor{margin-left:0.4em;color:#8c959f;text-decoration:none;opacity:0;}
h1:hover>.gw-heading-anchor,h2:hover>.gw-heading-anchor,h3:hover>.gw-heading-anchor,h4:hover>.gw-heading-anchor{opacity:1;}
p,ul,ol,blockquote,table,pre,figure{margin:0 0 1em;}
a{color:#0969da;text-decoration:none;}
a:hover{text-decoration:underline;}
img{max-width:100%;height:auto;}
code{font-family:"JetBrains Mono",SFMono-Regular,Consolas,monospace;font-size:0.875em;background:#f6f8fa;border-radius:0.25rem;padding:0.15em 0.35em;}
pre{background:#f6f8fa;border-radius:0.375rem;padding:1em;overflow-x:auto;line-height:1.45;}
pre code{background:none;padding:0;font-size:0.85em;white-space:pre-wrap;}
blockquote{margin-left:0;padding:0 1em;color:#59636e;border-left:0.25em solid #d0d7de;}
table{border-collapse:collapse;width:100%;}
th,td{border:1px solid #d0d7de;padding:0.4em 0.75em;}
th{background:#f6f8fa;font-weight:600;}
hr{border:0;border-top:1px solid #d8dee4;margin:1.5em 0;}
ul.contains-task-list{padding-left:0.5em;}
.task-list-item{list-style:none;}
.task-list-item input{margin:0 0.5em 0 0;vertical-align:middle;}
.gw-figure{margin:1em 0;text-align:center;}
.gw-figure img{display:inline-block;}
.gw-callout{margin:1em 0;padding:0.75em 1em;border-left:0.3em solid var(--gw-callout-accent);background:var(--gw-callout-bg);border-radius:0.25rem;}
.gw-callout-title{display:flex;align-items:center;gap:0.5em;font-weight:600;color:var(--gw-callout-accent);margin-bottom:0.35em;}
.gw-callout-icon::before{content:var(--gw-callout-icon);}
.gw-callout-body>:last-child{margin-bottom:0;}
.gw-title-page{display:flex;flex-direction:column;justify-content:center;align-items:center;text-align:center;}
.gw-title{font-size:2.5em;margin:0 0 0.75em;border:0;}
.gw-date,.gw-name{font-size:1.15em;color:#59636e;margin-top:0.35em;}
.footnotes{font-size:0.875em;color:#59636e;border-top:1px solid #d8dee4;margin-top:2em;}
.sr-only{position:absolute;width:1px;height:1px;overflow:hidden;clip:rect(0,0,0,0);white-space:nowrap;}
"#;

/// Accent color, background tint and CSS-escaped icon for a callout kind.
pub fn palette(kind: CalloutKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        CalloutKind::Note => ("#0969da", "#ddf4ff", "\\270E"),
        CalloutKind::Tip => ("#1a7f37", "#dafbe1", "\\1F4A1"),
        CalloutKind::Warning => ("#9a6700", "#fff8c5", "\\26A0"),
        CalloutKind::Caution => ("#cf222e", "#ffebe9", "\\26D4"),
        CalloutKind::Info => ("#8250df", "#fbefff", "\\2139"),
    }
}

/// One rule per callout kind setting the palette custom properties.
pub fn callout_css() -> String {
    CalloutKind::ALL
        .into_iter()
        .map(|kind| {
            let (accent, background, icon) = palette(kind);
            format!(
                ".gw-callout-{kind}{{--gw-callout-accent:{accent};--gw-callout-bg:{background};--gw-callout-icon:\"{icon}\";}}\n"
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_rule() {
        let css = callout_css();
        for kind in CalloutKind::ALL {
            assert!(css.contains(&format!(".gw-callout-{kind}{{")), "{kind}");
        }
    }

    #[test]
    fn note_rule() {
        insta::assert_snapshot!(
            callout_css().lines().next().unwrap_or_default(),
            @r#".gw-callout-note{--gw-callout-accent:#0969da;--gw-callout-bg:#ddf4ff;--gw-callout-icon:"\270E";}"#
        );
    }

    #[test]
    fn base_css_never_forces_breaks() {
        assert!(!BASE_CSS.contains("break-before"));
        assert!(!BASE_CSS.contains("break-after"));
        assert!(!BASE_CSS.contains("page-break"));
    }
}
