//! Profile MCP Tools
//!
//! Body data, macro goals and energy expenditure estimates.

use serde::Serialize;

use crate::db::{DataChange, Database};
use crate::models::{ProfileStore, ProfileUpdate, UserProfile};
use crate::nutrition::{ActivityLevel, EnergyEstimate, MacroTargets};

/// Response for get_profile / update_profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub energy: EnergyEstimate,
    pub activity_label: &'static str,
    /// Fields still needed for an energy estimate
    pub missing_for_estimate: Vec<&'static str>,
    pub targets: Option<MacroTargets>,
}

fn missing_fields(profile: &UserProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.weight.is_none() {
        missing.push("weight");
    }
    if profile.height.is_none() {
        missing.push("height");
    }
    if profile.age.is_none() {
        missing.push("age");
    }
    if profile.sex.is_none() {
        missing.push("sex");
    }
    missing
}

fn build_response(profile: UserProfile, level: ActivityLevel) -> ProfileResponse {
    ProfileResponse {
        energy: EnergyEstimate::for_profile(&profile, level),
        activity_label: level.label(),
        missing_for_estimate: missing_fields(&profile),
        targets: MacroTargets::from_profile(&profile),
        profile,
    }
}

fn parse_level(activity_level: Option<&str>) -> Result<ActivityLevel, String> {
    match activity_level.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse(),
        None => Ok(ActivityLevel::default()),
    }
}

/// Get the profile with BMR, TDEE for `activity_level` and macro targets
pub fn get_profile(db: &Database, activity_level: Option<&str>) -> Result<ProfileResponse, String> {
    let level = parse_level(activity_level)?;

    let profile = db
        .with_conn(ProfileStore::load)
        .map_err(|e| format!("Failed to load profile: {}", e))?;

    Ok(build_response(profile, level))
}

/// Write the provided profile fields
pub fn update_profile(
    db: &Database,
    update: ProfileUpdate,
    activity_level: Option<&str>,
) -> Result<ProfileResponse, String> {
    if update.is_empty() {
        return Err("No profile fields provided".to_string());
    }
    let level = parse_level(activity_level)?;

    let profile = db
        .write(DataChange::Profile, |conn| ProfileStore::update(conn, &update))
        .map_err(|e| format!("Failed to update profile: {}", e))?;

    tracing::info!("profile updated");
    Ok(build_response(profile, level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        db
    }

    #[test]
    fn test_empty_profile_has_no_estimate() {
        let db = db();
        let response = get_profile(&db, None).unwrap();

        assert!(!response.energy.has_estimate());
        assert_eq!(response.missing_for_estimate, vec!["weight", "height", "age", "sex"]);
        assert!(response.targets.is_none());
        assert_eq!(response.energy.activity_level, ActivityLevel::Sedentary);
    }

    #[test]
    fn test_update_then_estimate() {
        let db = db();
        let response = update_profile(
            &db,
            ProfileUpdate {
                weight: Some(70.0),
                height: Some(175.0),
                age: Some(25),
                sex: Some("Masculino".to_string()),
                ..Default::default()
            },
            Some("moderate"),
        )
        .unwrap();

        assert_eq!(response.energy.bmr, 1673.75);
        assert!((response.energy.tdee - 1673.75 * 1.55).abs() < 1e-9);
        assert!(response.missing_for_estimate.is_empty());
        assert_eq!(response.targets.unwrap().protein_g, 140.0);

        let light = get_profile(&db, Some("light")).unwrap();
        assert_eq!(light.energy.multiplier, 1.375);
    }

    #[test]
    fn test_rejects_bad_input() {
        let db = db();
        assert!(get_profile(&db, Some("couch potato")).is_err());
        assert!(update_profile(&db, ProfileUpdate::default(), None).is_err());
        assert!(update_profile(
            &db,
            ProfileUpdate {
                height: Some(0.0),
                ..Default::default()
            },
            None
        )
        .is_err());
    }
}
