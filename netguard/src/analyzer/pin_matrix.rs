//! Pin Conflict Matrix
//!
//! Static compatibility table between electrical pin types. The table is
//! symmetric: looking up `(a, b)` and `(b, a)` always yields the same
//! severity.

use serde::{Deserialize, Serialize};

/// Electrical type declared by a symbol pin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectricalPinType {
    Input,
    Output,
    Bidirectional,
    TriState,
    Passive,
    Free,
    #[default]
    Unspecified,
    PowerIn,
    PowerOut,
    OpenCollector,
    OpenEmitter,
    NoConnect,
}

const PIN_TYPE_COUNT: usize = 12;

impl ElectricalPinType {
    pub const ALL: [ElectricalPinType; PIN_TYPE_COUNT] = [
        ElectricalPinType::Input,
        ElectricalPinType::Output,
        ElectricalPinType::Bidirectional,
        ElectricalPinType::TriState,
        ElectricalPinType::Passive,
        ElectricalPinType::Free,
        ElectricalPinType::Unspecified,
        ElectricalPinType::PowerIn,
        ElectricalPinType::PowerOut,
        ElectricalPinType::OpenCollector,
        ElectricalPinType::OpenEmitter,
        ElectricalPinType::NoConnect,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Normalize a free-form pin type string from a symbol library.
    ///
    /// Matching is case-insensitive: an exact alias wins, then the first alias
    /// contained in the input. Anything else is `Unspecified`.
    pub fn from_alias(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");

        if let Some((_, pin_type)) = PIN_TYPE_ALIASES.iter().find(|(alias, _)| *alias == normalized) {
            return *pin_type;
        }

        PIN_TYPE_ALIASES
            .iter()
            .find(|(alias, _)| alias.len() > 2 && normalized.contains(alias))
            .map(|(_, pin_type)| *pin_type)
            .unwrap_or(ElectricalPinType::Unspecified)
    }
}

impl std::fmt::Display for ElectricalPinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElectricalPinType::Input => write!(f, "Input"),
            ElectricalPinType::Output => write!(f, "Output"),
            ElectricalPinType::Bidirectional => write!(f, "Bidirectional"),
            ElectricalPinType::TriState => write!(f, "Tri-State"),
            ElectricalPinType::Passive => write!(f, "Passive"),
            ElectricalPinType::Free => write!(f, "Free"),
            ElectricalPinType::Unspecified => write!(f, "Unspecified"),
            ElectricalPinType::PowerIn => write!(f, "Power Input"),
            ElectricalPinType::PowerOut => write!(f, "Power Output"),
            ElectricalPinType::OpenCollector => write!(f, "Open Collector"),
            ElectricalPinType::OpenEmitter => write!(f, "Open Emitter"),
            ElectricalPinType::NoConnect => write!(f, "No Connect"),
        }
    }
}

// Longer aliases come before their prefixes so substring matching prefers
// "power_out" over "out".
const PIN_TYPE_ALIASES: &[(&str, ElectricalPinType)] = &[
    ("power_in", ElectricalPinType::PowerIn),
    ("power_input", ElectricalPinType::PowerIn),
    ("pwr_in", ElectricalPinType::PowerIn),
    ("power_out", ElectricalPinType::PowerOut),
    ("power_output", ElectricalPinType::PowerOut),
    ("pwr_out", ElectricalPinType::PowerOut),
    ("open_collector", ElectricalPinType::OpenCollector),
    ("opencollector", ElectricalPinType::OpenCollector),
    ("open_emitter", ElectricalPinType::OpenEmitter),
    ("openemitter", ElectricalPinType::OpenEmitter),
    ("no_connect", ElectricalPinType::NoConnect),
    ("noconnect", ElectricalPinType::NoConnect),
    ("not_connected", ElectricalPinType::NoConnect),
    ("unconnected", ElectricalPinType::NoConnect),
    ("nc", ElectricalPinType::NoConnect),
    ("tri_state", ElectricalPinType::TriState),
    ("tristate", ElectricalPinType::TriState),
    ("3state", ElectricalPinType::TriState),
    ("bidirectional", ElectricalPinType::Bidirectional),
    ("bidi", ElectricalPinType::Bidirectional),
    ("bi", ElectricalPinType::Bidirectional),
    ("io", ElectricalPinType::Bidirectional),
    ("unspecified", ElectricalPinType::Unspecified),
    ("passive", ElectricalPinType::Passive),
    ("free", ElectricalPinType::Free),
    ("input", ElectricalPinType::Input),
    ("in", ElectricalPinType::Input),
    ("output", ElectricalPinType::Output),
    ("out", ElectricalPinType::Output),
];

/// Result of pairing two pin types on one net. Ordered `Ok < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PinConflictSeverity {
    Ok,
    Warning,
    Error,
}

/// Symmetric lookup table indexed by a pair of pin types
#[derive(Debug, Clone)]
pub struct PinConflictMatrix {
    table: [[PinConflictSeverity; PIN_TYPE_COUNT]; PIN_TYPE_COUNT],
}

impl PinConflictMatrix {
    pub fn new() -> Self {
        use ElectricalPinType::*;

        let mut matrix = Self {
            table: [[PinConflictSeverity::Ok; PIN_TYPE_COUNT]; PIN_TYPE_COUNT],
        };

        matrix.set(Output, Output, PinConflictSeverity::Error);
        matrix.set(PowerOut, PowerOut, PinConflictSeverity::Error);
        matrix.set(Output, PowerOut, PinConflictSeverity::Error);
        for other in [
            Input,
            Output,
            Bidirectional,
            TriState,
            PowerIn,
            PowerOut,
            OpenCollector,
            OpenEmitter,
        ] {
            matrix.set(NoConnect, other, PinConflictSeverity::Error);
        }

        for other in ElectricalPinType::ALL {
            if other != NoConnect {
                matrix.set(Unspecified, other, PinConflictSeverity::Warning);
            }
        }
        matrix.set(TriState, Output, PinConflictSeverity::Warning);
        matrix.set(TriState, TriState, PinConflictSeverity::Warning);

        // Passive and free pins tolerate everything; applied last so they win.
        for other in ElectricalPinType::ALL {
            if other != NoConnect {
                matrix.set(Passive, other, PinConflictSeverity::Ok);
            }
            matrix.set(Free, other, PinConflictSeverity::Ok);
        }

        matrix
    }

    fn set(&mut self, a: ElectricalPinType, b: ElectricalPinType, severity: PinConflictSeverity) {
        self.table[a.index()][b.index()] = severity;
        self.table[b.index()][a.index()] = severity;
    }

    pub fn check(&self, a: ElectricalPinType, b: ElectricalPinType) -> PinConflictSeverity {
        self.table[a.index()][b.index()]
    }

    /// Look up two raw pin type strings after alias normalization.
    pub fn check_names(&self, a: &str, b: &str) -> PinConflictSeverity {
        self.check(ElectricalPinType::from_alias(a), ElectricalPinType::from_alias(b))
    }
}

impl Default for PinConflictMatrix {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ElectricalPinType::*;

    #[test]
    fn test_matrix_is_symmetric() {
        let matrix = PinConflictMatrix::new();
        for a in ElectricalPinType::ALL {
            for b in ElectricalPinType::ALL {
                assert_eq!(matrix.check(a, b), matrix.check(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_error_pairs() {
        let matrix = PinConflictMatrix::new();
        assert_eq!(matrix.check(Output, Output), PinConflictSeverity::Error);
        assert_eq!(matrix.check(PowerOut, PowerOut), PinConflictSeverity::Error);
        assert_eq!(matrix.check(PowerOut, Output), PinConflictSeverity::Error);
        assert_eq!(matrix.check(NoConnect, Input), PinConflictSeverity::Error);
        assert_eq!(matrix.check(OpenEmitter, NoConnect), PinConflictSeverity::Error);
    }

    #[test]
    fn test_warning_pairs() {
        let matrix = PinConflictMatrix::new();
        assert_eq!(matrix.check(Unspecified, Unspecified), PinConflictSeverity::Warning);
        assert_eq!(matrix.check(Unspecified, Input), PinConflictSeverity::Warning);
        assert_eq!(matrix.check(TriState, Output), PinConflictSeverity::Warning);
        assert_eq!(matrix.check(TriState, TriState), PinConflictSeverity::Warning);
        assert_eq!(matrix.check(Unspecified, NoConnect), PinConflictSeverity::Ok);
    }

    #[test]
    fn test_passive_and_free_override() {
        let matrix = PinConflictMatrix::new();
        assert_eq!(matrix.check(Passive, Unspecified), PinConflictSeverity::Ok);
        assert_eq!(matrix.check(Passive, Output), PinConflictSeverity::Ok);
        assert_eq!(matrix.check(Passive, NoConnect), PinConflictSeverity::Ok);
        assert_eq!(matrix.check(Free, NoConnect), PinConflictSeverity::Ok);
        assert_eq!(matrix.check(Free, Unspecified), PinConflictSeverity::Ok);
        assert_eq!(matrix.check(Input, Output), PinConflictSeverity::Ok);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(PinConflictSeverity::Ok < PinConflictSeverity::Warning);
        assert!(PinConflictSeverity::Warning < PinConflictSeverity::Error);
    }

    #[test]
    fn test_alias_normalization() {
        assert_eq!(ElectricalPinType::from_alias("tristate"), TriState);
        assert_eq!(ElectricalPinType::from_alias("Tri-State"), TriState);
        assert_eq!(ElectricalPinType::from_alias("POWER_IN"), PowerIn);
        assert_eq!(ElectricalPinType::from_alias("power output"), PowerOut);
        assert_eq!(ElectricalPinType::from_alias("passive"), Passive);
        assert_eq!(ElectricalPinType::from_alias("no_connect"), NoConnect);
        assert_eq!(ElectricalPinType::from_alias("nc"), NoConnect);
        assert_eq!(ElectricalPinType::from_alias("open_collector"), OpenCollector);
        assert_eq!(ElectricalPinType::from_alias("input"), Input);
        assert_eq!(ElectricalPinType::from_alias("output"), Output);
        assert_eq!(ElectricalPinType::from_alias("Bidirectional"), Bidirectional);
        assert_eq!(ElectricalPinType::from_alias("unspecified"), Unspecified);
        assert_eq!(ElectricalPinType::from_alias("??"), Unspecified);
        assert_eq!(ElectricalPinType::from_alias(""), Unspecified);
    }

    #[test]
    fn test_alias_substring_match() {
        assert_eq!(ElectricalPinType::from_alias("pin_power_in_vdd"), PowerIn);
        assert_eq!(ElectricalPinType::from_alias("tristate_output"), TriState);
        assert_eq!(ElectricalPinType::from_alias("digital_output"), Output);
    }

    #[test]
    fn test_check_names() {
        let matrix = PinConflictMatrix::new();
        assert_eq!(matrix.check_names("output", "OUTPUT"), PinConflictSeverity::Error);
        assert_eq!(matrix.check_names("passive", "whatever"), PinConflictSeverity::Ok);
    }

    #[test]
    fn test_unconnected_display_name_is_no_connect() {
        assert_eq!(ElectricalPinType::from_alias("Unconnected"), NoConnect);
        let matrix = PinConflictMatrix::new();
        assert_eq!(matrix.check_names("Unconnected", "output"), PinConflictSeverity::Error);
        assert_eq!(matrix.check_names("free", "output"), PinConflictSeverity::Ok);
    }
}
