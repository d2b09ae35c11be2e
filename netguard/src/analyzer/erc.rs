//! Electrical Rules Checker
//!
//! Runs the configured rule battery over one schematic. Net analysis runs
//! once per [`ErcChecker::check`]; when it fails, net-dependent rules are
//! skipped and the geometric/metadata rules still report.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzer::rules::*;
use crate::connectivity::{NetAnalysis, NetExtractor, PinConnection};
use crate::core::NetguardError;
use crate::schematic::{Schematic, SymbolLookup};

/// Options for an ERC run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErcConfig {
    pub check_pin_conflicts: bool,
    pub check_unconnected_pins: bool,
    pub check_duplicate_references: bool,
    pub check_off_grid: bool,
    pub check_missing_footprints: bool,
    pub check_missing_values: bool,
    pub treat_warnings_as_errors: bool,
    pub grid_size: f64,
}

impl Default for ErcConfig {
    fn default() -> Self {
        Self {
            check_pin_conflicts: true,
            check_unconnected_pins: true,
            check_duplicate_references: true,
            check_off_grid: true,
            check_missing_footprints: false,
            check_missing_values: false,
            treat_warnings_as_errors: false,
            grid_size: 1.27,
        }
    }
}

impl ErcConfig {
    pub fn from_json_str(json: &str) -> Result<Self, NetguardError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErcResult {
    pub violations: Vec<ErcViolation>,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub passed: bool,
    pub checked_at: DateTime<Utc>,
}

impl ErcResult {
    pub fn from_violations(violations: Vec<ErcViolation>, treat_warnings_as_errors: bool) -> Self {
        let mut error_count = 0;
        let mut warning_count = 0;
        let mut info_count = 0;
        for v in &violations {
            match v.severity {
                Severity::Error => error_count += 1,
                Severity::Warning => warning_count += 1,
                Severity::Info => info_count += 1,
            }
        }

        let passed = if treat_warnings_as_errors {
            error_count + warning_count == 0
        } else {
            error_count == 0
        };

        Self {
            violations,
            error_count,
            warning_count,
            info_count,
            passed,
            checked_at: Utc::now(),
        }
    }

    pub fn violations_with_code(&self, code: ErcCode) -> impl Iterator<Item = &ErcViolation> {
        self.violations.iter().filter(move |v| v.code == code)
    }

    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &ErcViolation> {
        self.violations.iter().filter(move |v| v.severity == severity)
    }

    pub fn total_violations(&self) -> usize {
        self.violations.len()
    }
}

pub struct ErcChecker<'a> {
    schematic: &'a Schematic,
    symbols: &'a dyn SymbolLookup,
    config: ErcConfig,
    rules: Vec<Arc<dyn Rule>>,
}

impl<'a> ErcChecker<'a> {
    pub fn new(schematic: &'a Schematic, symbols: &'a dyn SymbolLookup, config: ErcConfig) -> Self {
        let mut rules: Vec<Arc<dyn Rule>> = Vec::new();
        if config.check_pin_conflicts {
            rules.push(Arc::new(PinConflictRule::new()));
        }
        if config.check_unconnected_pins {
            rules.push(Arc::new(UnconnectedPinRule));
        }
        if config.check_duplicate_references {
            rules.push(Arc::new(DuplicateReferenceRule));
        }
        if config.check_off_grid {
            rules.push(Arc::new(OffGridRule));
        }
        if config.check_missing_footprints {
            rules.push(Arc::new(MissingFootprintRule));
        }
        if config.check_missing_values {
            rules.push(Arc::new(MissingValueRule));
        }
        rules.push(Arc::new(FloatingLabelRule));

        Self {
            schematic,
            symbols,
            config,
            rules,
        }
    }

    pub fn config(&self) -> &ErcConfig {
        &self.config
    }

    /// Ids of the rules this checker will run, in order.
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn check(&self) -> ErcResult {
        let extractor = NetExtractor::new(self.schematic, self.symbols);

        let net_data: Option<(NetAnalysis, Vec<PinConnection>)> =
            match extractor.analyze_nets().and_then(|a| Ok((a, extractor.declared_pins()?))) {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::warn!("Net analysis failed, skipping pin checks: {}", e);
                    None
                }
            };

        let ctx = RuleContext {
            schematic: self.schematic,
            analysis: net_data.as_ref().map(|(analysis, _)| analysis),
            pins: net_data.as_ref().map(|(_, pins)| pins.as_slice()),
            grid_size: self.config.grid_size,
        };

        let mut violations = Vec::new();
        for rule in &self.rules {
            let found = rule.check(&ctx);
            if !found.is_empty() {
                tracing::debug!("{}: {} violations", rule.name(), found.len());
            }
            violations.extend(found);
        }

        let result = ErcResult::from_violations(violations, self.config.treat_warnings_as_errors);
        tracing::info!(
            "ERC finished: {} errors, {} warnings, {} info",
            result.error_count,
            result.warning_count,
            result.info_count
        );
        result
    }
}
