//! Configuration tests.
//!
//! Verifies the configuration surface:
//! 1. **Cache Syntax:** `policy,sets,blocksize,assoc[,wp]` parsing, errors and display.
//! 2. **Hazard Units:** Name parsing including the legacy alias.
//! 3. **JSON:** Defaults for omitted fields and validation on load.

use std::io::Write;

use mipsim_core::common::{ConfigError, ExceptionCause, SimError};
use mipsim_core::config::{
    BranchStage, CacheConfig, ExceptionPolicy, HazardUnit, MachineConfig, ReplacementPolicy,
    WritePolicy,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// Cache syntax
// ══════════════════════════════════════════════════════════

#[rstest]
#[case("lru,4,2,2,wb", ReplacementPolicy::Lru, (4, 2, 2), WritePolicy::WriteBack)]
#[case("lfu,1,4,8,wta", ReplacementPolicy::Lfu, (1, 4, 8), WritePolicy::WriteThroughAlloc)]
#[case("random,16,1,1,wt", ReplacementPolicy::Random, (16, 1, 1), WritePolicy::WriteThroughNoAlloc)]
#[case("LRU, 2, 2, 1", ReplacementPolicy::Lru, (2, 2, 1), WritePolicy::WriteThroughNoAlloc)]
fn cache_description_parses(
    #[case] text: &str,
    #[case] replacement: ReplacementPolicy,
    #[case] geometry: (u32, u32, u32),
    #[case] write_policy: WritePolicy,
) {
    let config: CacheConfig = text.parse().unwrap();
    assert!(config.enabled);
    assert_eq!(config.replacement, replacement);
    assert_eq!((config.sets, config.blocks, config.associativity), geometry);
    assert_eq!(config.write_policy, write_policy);
}

#[rstest]
#[case("lru,4,2", ConfigError::CacheFieldCount("lru,4,2".into()))]
#[case("lru,4,2,2,wb,x", ConfigError::CacheFieldCount("lru,4,2,2,wb,x".into()))]
#[case("fifo,4,2,2", ConfigError::ReplacementPolicy("fifo".into()))]
#[case("lru,4,2,2,copyback", ConfigError::WritePolicy("copyback".into()))]
#[case("lru,0,2,2", ConfigError::Number { field: "sets", value: "0".into() })]
#[case("lru,4,x,2", ConfigError::Number { field: "block size", value: "x".into() })]
#[case("lru,4,2,-1", ConfigError::Number { field: "associativity", value: "-1".into() })]
#[case("lru,65536,65536,1", ConfigError::Geometry { sets: 65536, blocks: 65536, ways: 1 })]
fn bad_cache_description_is_rejected(#[case] text: &str, #[case] error: ConfigError) {
    assert_eq!(text.parse::<CacheConfig>(), Err(error));
}

#[test]
fn cache_display_round_trips() {
    let config: CacheConfig = "lfu,8,4,2,wt".parse().unwrap();
    assert_eq!(config.to_string(), "lfu,8,4,2,wtna");
    assert_eq!(config.to_string().parse::<CacheConfig>(), Ok(config));
    assert_eq!(CacheConfig::default().to_string(), "disabled");
}

#[test]
fn zero_geometry_is_clamped() {
    let config = CacheConfig::new(0, 0, 0, ReplacementPolicy::Lru, WritePolicy::WriteBack);
    assert_eq!((config.sets, config.blocks, config.associativity), (1, 1, 1));
    assert_eq!(config.line_count(), 1);
}

#[test]
fn disabled_cache_skips_geometry_check() {
    let config = CacheConfig {
        enabled: false,
        sets: 1 << 20,
        blocks: 1 << 20,
        ..CacheConfig::default()
    };
    assert_eq!(config.validate(), Ok(()));
}

// ══════════════════════════════════════════════════════════
// Hazard units
// ══════════════════════════════════════════════════════════

#[rstest]
#[case("none", HazardUnit::None)]
#[case("stall", HazardUnit::Stall)]
#[case("forward", HazardUnit::Forward)]
#[case("stall-forward", HazardUnit::Forward)]
#[case("Forward", HazardUnit::Forward)]
fn hazard_unit_names(#[case] text: &str, #[case] unit: HazardUnit) {
    assert_eq!(text.parse::<HazardUnit>(), Ok(unit));
}

#[test]
fn unknown_hazard_unit() {
    assert_eq!(
        "bypass".parse::<HazardUnit>(),
        Err(ConfigError::HazardUnit("bypass".into()))
    );
}

// ══════════════════════════════════════════════════════════
// JSON
// ══════════════════════════════════════════════════════════

#[test]
fn empty_json_gives_defaults() {
    let config = MachineConfig::from_json_str("{}").unwrap();
    assert_eq!(config, MachineConfig::default());
    assert!(config.delay_slot);
    assert!(!config.pipelined);
    assert_eq!(config.reset_pc, 0x8002_0000);
    assert_eq!(config.hazard_unit, HazardUnit::Forward);
    assert_eq!(config.branch_stage, BranchStage::Execute);
    assert_eq!(config.memory_timing.read, 10);
    assert_eq!(config.memory_timing.level2, 2);
    assert!(!config.cache_data.enabled);
}

#[test]
fn partial_json_overrides_only_given_fields() {
    let config = MachineConfig::from_json_str(
        r#"{
            "pipelined": true,
            "hazard_unit": "stall",
            "branch_stage": "memory",
            "memory_timing": { "read": 4 },
            "cache_data": { "enabled": true, "sets": 0, "replacement": "lru", "write_policy": "wt" },
            "cycle_limit": 1000
        }"#,
    )
    .unwrap();
    assert!(config.pipelined);
    assert_eq!(config.hazard_unit, HazardUnit::Stall);
    assert_eq!(config.branch_stage, BranchStage::Memory);
    assert_eq!(config.memory_timing.read, 4);
    assert_eq!(config.memory_timing.write, 10);
    assert_eq!(config.cache_data.sets, 1, "zero geometry not clamped");
    assert_eq!(config.cache_data.replacement, ReplacementPolicy::Lru);
    assert_eq!(config.cache_data.write_policy, WritePolicy::WriteThroughNoAlloc);
    assert_eq!(config.cycle_limit, Some(1000));
}

#[test]
fn json_errors_are_classified() {
    assert!(matches!(
        MachineConfig::from_json_str("{ not json"),
        Err(SimError::Json(_))
    ));
    assert!(matches!(
        MachineConfig::from_json_str(
            r#"{ "cache_level2": { "enabled": true, "sets": 1073741824, "blocks": 2 } }"#
        ),
        Err(SimError::Config(ConfigError::Geometry { .. }))
    ));
}

#[test]
fn json_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{ "delay_slot": false, "interrupt_mask": 4 }"#).unwrap();
    let config = MachineConfig::from_json_file(file.path()).unwrap();
    assert!(!config.delay_slot);
    assert_eq!(config.interrupt_mask, 4);

    assert!(matches!(
        MachineConfig::from_json_file(file.path().with_extension("missing")),
        Err(SimError::Io(_))
    ));
}

#[test]
fn exception_policy_defaults() {
    let policy = ExceptionPolicy::default();
    for cause in [
        ExceptionCause::Break,
        ExceptionCause::Syscall,
        ExceptionCause::Overflow,
        ExceptionCause::UnalignedAddress,
    ] {
        assert!(policy.stop_on(cause));
        assert!(policy.step_over(cause));
    }
    assert!(policy.stop_on(ExceptionCause::Interrupt));
    assert!(!policy.step_over(ExceptionCause::Interrupt));
}
