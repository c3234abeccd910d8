//! Text protocol of the Horizons telnet service
//!
//! Prompts, data markers and element labels exactly as the service prints
//! them. These patterns are a compatibility contract: the transcripts under
//! `tests/` pin them down, and any change must keep those passing.

use once_cell::sync::OnceCell;

use super::record::ElementField;
use crate::error::Result;
use crate::expect::Pattern;

/// Start-of-data marker
pub const START_OF_DATA: &str = "$$SOE";
/// End-of-data marker
pub const END_OF_DATA: &str = "$$EOE";

/// Record header: `<JD> = <A.D. yyyy-Mon-dd hh:mm:ss.ffff> (<flag>)`
pub const HEADER_REGEX: &str =
    r"(?mR)^(\d+\.\d+) = (.\..\. \d{4}-(?:.{3})-\d{2} \d{2}:\d{2}:\d{2}.\d{4}) \((..)\)$";

/// Regex for one labeled element value followed by whitespace.
///
/// The value must be non-empty: with an optional value, `EC= 1.23` cut at a
/// chunk boundary would already match with an empty capture.
pub fn field_regex(label: &str) -> String {
    format!(r"\b{}\s*=\s*([0-9.E+-]+)\s", regex::escape(label))
}

/// Compiled pattern set for one dialogue
#[derive(Debug, Clone)]
pub struct Protocol {
    pub main_prompt: Pattern,
    pub continue_prompt: Pattern,
    pub select_prompt: Pattern,
    pub element_menu: Pattern,
    pub center_prompt: Pattern,
    pub plane_prompt: Pattern,
    pub start_prompt: Pattern,
    pub end_prompt: Pattern,
    pub interval_prompt: Pattern,
    pub accept_defaults: Pattern,
    pub start_of_data: Pattern,
    pub end_of_data: Pattern,
    pub menu_return: Pattern,
    pub header: Pattern,
    fields: Vec<(ElementField, Pattern)>,
}

static SHARED: OnceCell<Protocol> = OnceCell::new();

impl Protocol {
    /// Compile every pattern
    pub fn new() -> Result<Self> {
        let fields = ElementField::ALL
            .iter()
            .map(|field| -> Result<(ElementField, Pattern)> {
                let pattern = Pattern::new(field.label(), &field_regex(field.label()))?;
                Ok((*field, pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            main_prompt: Pattern::new("Horizons>", r"Horizons>")?,
            continue_prompt: Pattern::new("Continue?", r"Continue.*")?,
            select_prompt: Pattern::new("Select", r"Select.*:.*")?,
            element_menu: Pattern::new("Observe/Elements/Vectors", r"Observe, Elements, Vectors.*:.*")?,
            center_prompt: Pattern::new("Coordinate center", r"Coordinate system center.*:.*")?,
            plane_prompt: Pattern::new("Reference plane", r"Reference plane.*:.*")?,
            start_prompt: Pattern::new("Starting CT", r"Starting CT.*:.*")?,
            end_prompt: Pattern::new("Ending CT", r"Ending.*CT.*:.*")?,
            interval_prompt: Pattern::new("Output interval", r"Output interval.*:.*")?,
            accept_defaults: Pattern::new("Accept defaults", r"Accept default.*:.*")?,
            start_of_data: Pattern::new(START_OF_DATA, &regex::escape(START_OF_DATA))?,
            end_of_data: Pattern::new(END_OF_DATA, &regex::escape(END_OF_DATA))?,
            menu_return: Pattern::new(">>> Select", r">>> Select.*:.*")?,
            header: Pattern::new("record header", HEADER_REGEX)?,
            fields,
        })
    }

    /// Process-wide instance, compiled on first use
    pub fn shared() -> Result<&'static Protocol> {
        SHARED.get_or_try_init(Protocol::new)
    }

    /// Element field patterns in scan order
    pub fn fields(&self) -> &[(ElementField, Pattern)] {
        &self.fields
    }
}
