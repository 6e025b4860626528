//! Unit tests for the tier cell and tier parsing

use finsight::core::tier_cell;
use finsight::models::Tier;

#[test]
fn test_readers_see_initial_tier() {
    let (writer, reader) = tier_cell(Tier::Pro);
    assert_eq!(reader.current(), Tier::Pro);
    assert_eq!(writer.current(), Tier::Pro);
    assert_eq!(writer.reader().current(), Tier::Pro);
    assert_eq!(reader.clone().current(), Tier::Pro);
}

#[test]
fn test_tier_parsing_is_case_insensitive() {
    assert_eq!("elite".parse::<Tier>().unwrap(), Tier::Elite);
    assert_eq!(" Pro ".parse::<Tier>().unwrap(), Tier::Pro);
    assert_eq!("FREE".parse::<Tier>().unwrap(), Tier::Free);
    assert!("gold".parse::<Tier>().is_err());
}

#[test]
fn test_tier_wire_format() {
    assert_eq!(serde_json::to_string(&Tier::Elite).unwrap(), "\"ELITE\"");
    let tier: Tier = serde_json::from_str("\"PRO\"").unwrap();
    assert_eq!(tier, Tier::Pro);
    assert!(!Tier::Free.is_paid());
    assert!(Tier::Elite.rank() > Tier::Pro.rank());
}
