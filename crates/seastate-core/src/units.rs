// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Default unit table for result types.

use crate::error::MergeError;
use crate::model::{ResultType, Unit};

/// Default unit used when a new series is created without an explicit one.
///
/// Vessel motions and the dominant-direction quantities have no entry; asking
/// for them is an error rather than a silent fallback.
pub fn default_unit(result_type: ResultType) -> Result<Unit, MergeError> {
    use ResultType as R;
    let unit = match result_type {
        R::AngleRx | R::AngleRy | R::AngleRz => Unit::Degree,
        R::BendingMomentLocalX | R::BendingMomentLocalY => Unit::KiloNewtonMetre,
        R::ShearForceLocalX | R::ShearForceLocalY | R::EffectiveTension => Unit::KiloNewton,
        R::DisplacementX
        | R::DisplacementY
        | R::DisplacementZ
        | R::PositionX
        | R::PositionY
        | R::PositionZ => Unit::Metre,
        R::VelocityX | R::VelocityY | R::VelocityZ => Unit::MetrePerSecond,
        R::VesselHeave
        | R::VesselSurge
        | R::VesselSway
        | R::VesselRoll
        | R::VesselPitch
        | R::VesselYaw
        | R::BendingMomentDominantDirection
        | R::ShearForceDominantDirection => {
            return Err(MergeError::NoDefaultUnit(result_type));
        }
    };
    Ok(unit)
}

/// Explicit unit if given, otherwise the table default.
pub fn resolve_unit(result_type: ResultType, explicit: Option<Unit>) -> Result<Unit, MergeError> {
    match explicit {
        Some(unit) => Ok(unit),
        None => default_unit(result_type),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn table_entries() {
        assert_eq!(default_unit(ResultType::AngleRy), Ok(Unit::Degree));
        assert_eq!(
            default_unit(ResultType::BendingMomentLocalX),
            Ok(Unit::KiloNewtonMetre)
        );
        assert_eq!(default_unit(ResultType::EffectiveTension), Ok(Unit::KiloNewton));
        assert_eq!(default_unit(ResultType::PositionZ), Ok(Unit::Metre));
        assert_eq!(default_unit(ResultType::VelocityX), Ok(Unit::MetrePerSecond));
    }

    #[test]
    fn missing_entry_names_the_result_type() {
        let err = default_unit(ResultType::VesselHeave).unwrap_err();
        assert_eq!(err, MergeError::NoDefaultUnit(ResultType::VesselHeave));
        assert!(err.to_string().contains("vessel heave"));
    }

    #[test]
    fn explicit_unit_wins_even_without_table_entry() {
        assert_eq!(
            resolve_unit(ResultType::VesselRoll, Some(Unit::Radian)),
            Ok(Unit::Radian)
        );
        assert_eq!(
            resolve_unit(ResultType::AngleRx, Some(Unit::Radian)),
            Ok(Unit::Radian)
        );
    }
}
