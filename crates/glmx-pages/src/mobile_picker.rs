//! Mobile tap-to-select support for the variable picker on `systematic.html`.
//!
//! Drag and drop does not work on touch screens. The shared
//! `variable-picker.js` adds a tap-to-select fallback; this rewrite wires a
//! page up to it in three independent steps:
//!
//! 1. selected-state and hint-toast CSS after the `.variable-card.dimmed` rule
//! 2. a `<script>` tag for `variable-picker.js` before the inline script
//! 3. the drag-only `setupDropZones` replaced by a call to `initVariablePicker`

use crate::edit::{EditOutcome, PageEdit, SkipReason};
use crate::Result;
use regex::{Captures, NoExpand, Regex};
use std::path::Path;
use std::sync::LazyLock;

/// Tutorials whose systematic page still needs converting (tutorial 1 ships
/// with the picker already).
pub const MOBILE_PICKER_TUTORIALS: [&str; 4] = ["02-logistic", "03-poisson", "04-negbin", "05-gamma"];

static DIMMED_RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.variable-card\.dimmed \{[^}]+\})").expect("valid regex"));

static INLINE_SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\n  <script>\n    // )").expect("valid regex"));

/// The drag-only handler: from its signature through the close of the zone
/// loop (indented six spaces) and the function's own closing brace.
static SETUP_DROP_ZONES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)    function setupDropZones\(\) \{[^}]+\[predictorZone, responseZone\]\.forEach\(zone => \{.*?\n      \}\);[ \t]*\n    \}",
    )
    .expect("valid regex")
});

const MOBILE_CSS: &str = r#"
    /* Mobile: Selected state for tap-to-select */
    .variable-card.selected {
      border-color: #9b59b6;
      background: #f5eef8;
      box-shadow: 0 0 0 3px rgba(155, 89, 182, 0.3);
    }

    /* Mobile hint toast */
    .mobile-picker-hint {
      position: fixed;
      bottom: 20px;
      left: 50%;
      transform: translateX(-50%) translateY(100px);
      background: #2c3e50;
      color: white;
      padding: 12px 24px;
      border-radius: 8px;
      font-size: 0.9em;
      z-index: 1000;
      opacity: 0;
      transition: all 0.3s ease;
      pointer-events: none;
    }

    .mobile-picker-hint.show {
      transform: translateX(-50%) translateY(0);
      opacity: 1;
    }

    /* Touch device: change cursor and add tap hint */
    .touch-device .variable-card:not(.dimmed) {
      cursor: pointer;
    }

    .touch-device .variable-card .target-badge {
      content: 'Tap me!';
    }

    .touch-device .target-badge::after {
      content: ' (tap)';
    }
"#;

const PICKER_SCRIPT: &str = "\n  <!-- Load variable picker before main script -->\n  <script src=\"../../js/variable-picker.js\"></script>\n\n  <script>\n    // ";

const NEW_SETUP_DROP_ZONES: &str = r#"    function setupDropZones() {
      // Initialize the variable picker with mobile support
      initVariablePicker({
        variablePool: variablePool,
        predictorZone: predictorZone,
        responseZone: responseZone,

        // Validate if this drop is allowed for the current step
        validateDrop: function(varName, zoneType) {
          const step = steps[currentStep];
          const expectedZone = step.target?.zone;
          const expectedVar = step.target?.variable;

          return varName === expectedVar && zoneType === expectedZone;
        },

        // Handle successful drop
        onDrop: function(varName, zoneType) {
          if (zoneType === 'predictor') {
            selectedPredictors.push(varName);
          } else {
            selectedResponse = varName;
          }

          renderAssigned();

          // Advance step after short delay
          setTimeout(() => {
            currentStep++;
            updateStep();
          }, 400);
        }
      });
    }"#;

/// Tap-to-select rewrite for systematic pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct MobilePicker;

impl PageEdit for MobilePicker {
    fn name(&self) -> &'static str {
        "mobile-picker"
    }

    fn edit(&self, _path: &Path, content: &str) -> Result<EditOutcome> {
        if content.contains(".variable-card.selected") {
            return Ok(EditOutcome::Skipped(SkipReason::AlreadyApplied("mobile CSS")));
        }

        let mut updated = content.to_string();
        let mut steps = Vec::new();

        if DIMMED_RULE_RE.is_match(&updated) {
            updated = DIMMED_RULE_RE
                .replace_all(&updated, |caps: &Captures| format!("{}\n{}", &caps[1], MOBILE_CSS))
                .into_owned();
            steps.push("CSS");
        }

        if !updated.contains("variable-picker.js") && INLINE_SCRIPT_RE.is_match(&updated) {
            updated = INLINE_SCRIPT_RE
                .replace(&updated, NoExpand(PICKER_SCRIPT))
                .into_owned();
            steps.push("script tag");
        }

        if SETUP_DROP_ZONES_RE.is_match(&updated) {
            updated = SETUP_DROP_ZONES_RE
                .replace_all(&updated, NoExpand(NEW_SETUP_DROP_ZONES))
                .into_owned();
            steps.push("setupDropZones");
        }

        if steps.is_empty() {
            return Ok(EditOutcome::Skipped(SkipReason::NoChange));
        }
        Ok(EditOutcome::modified_with_note(updated, steps.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_PAGE: &str = "<html>
<head>
  <style>
    .variable-card.dimmed {
      opacity: 0.4;
    }
  </style>
</head>
<body>
  <div id=\"pool\"></div>

  <script>
    // Tutorial state
    let currentStep = 0;

    function setupDropZones() {
      const pool = variablePool;
      [predictorZone, responseZone].forEach(zone => {
        zone.addEventListener('drop', (e) => {
          e.preventDefault();
          if (zone.dataset.accepts) {
            accept(e, zone);
          }
        });
      });
    }

    function renderAssigned() {
      pool.render();
    }
  </script>
</body>
</html>";

    #[test]
    fn test_all_three_steps_applied() {
        let outcome = MobilePicker.edit(Path::new("systematic.html"), LEGACY_PAGE).unwrap();
        let EditOutcome::Modified { content, note } = outcome else {
            panic!("expected modification");
        };

        assert_eq!(note.as_deref(), Some("CSS, script tag, setupDropZones"));
        assert!(content.contains("opacity: 0.4;\n    }\n\n    /* Mobile: Selected state"));
        assert!(content.contains("<script src=\"../../js/variable-picker.js\"></script>\n\n  <script>\n    // Tutorial state"));
        assert!(content.contains("initVariablePicker({"));
        assert!(!content.contains("[predictorZone, responseZone].forEach"));
        // The rest of the script survives
        assert!(content.contains("let currentStep = 0;"));
        assert!(content.contains("    }\n\n    function renderAssigned() {"));
        assert!(!content.contains("accept(e, zone);"));
    }

    #[test]
    fn test_second_run_is_skipped() {
        let first = MobilePicker.edit(Path::new("systematic.html"), LEGACY_PAGE).unwrap();
        let content = first.content().unwrap();
        let second = MobilePicker.edit(Path::new("systematic.html"), content).unwrap();
        assert_eq!(
            second,
            EditOutcome::Skipped(SkipReason::AlreadyApplied("mobile CSS"))
        );
    }

    #[test]
    fn test_partial_page_without_css_rule() {
        let page = LEGACY_PAGE.replace(".variable-card.dimmed", ".card-muted");
        let outcome = MobilePicker.edit(Path::new("systematic.html"), &page).unwrap();
        let content = outcome.content().unwrap().to_string();
        assert!(!content.contains("Mobile hint toast"));
        assert!(content.contains("variable-picker.js"));

        // No CSS marker to guard on, but each step is itself guarded
        let again = MobilePicker.edit(Path::new("systematic.html"), &content).unwrap();
        assert_eq!(again, EditOutcome::Skipped(SkipReason::NoChange));
    }

    #[test]
    fn test_unrelated_page_is_untouched() {
        let outcome = MobilePicker
            .edit(Path::new("advanced.html"), "<html><body></body></html>")
            .unwrap();
        assert_eq!(outcome, EditOutcome::Skipped(SkipReason::NoChange));
    }
}
