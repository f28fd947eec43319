//! Action 0x00: property overrides.
//!
//! ```text
//! <00> <feature B> <num-props B> <num-info B> <first-id ext>
//!      (<property B> <value per entity>)...
//! ```

use tracing::trace;

use crate::Result;
use crate::actions::Context;
use crate::cursor::ByteReader;
use crate::features::bridge::{self, NUM_BRIDGES};
use crate::features::{GrfFeature, PropertyOutcome, globals, sound, station};

pub fn feature_change_info(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    if buf.len() == 1 {
        trace!("ignoring one-byte property record");
        return Ok(());
    }
    buf.require(4, "FeatureChangeInfo")?;
    let feature_id = buf.read_u8()?;
    let num_props = buf.read_u8()?;
    let count = buf.read_u8()? as usize;
    let first = buf.read_extended()? as usize;

    trace!(feature = feature_id, num_props, first, count, "FeatureChangeInfo");

    let Some(feature) = GrfFeature::from_u8(feature_id) else {
        ctx.diag
            .warn(format!("FeatureChangeInfo: Unsupported feature 0x{feature_id:02X}, skipping"));
        return Ok(());
    };

    let limit = match feature {
        GrfFeature::Trains | GrfFeature::RoadVehicles | GrfFeature::Ships | GrfFeature::Aircraft => {
            feature.vehicle_type().map(|v| v.count())
        }
        GrfFeature::Bridges => Some(NUM_BRIDGES),
        GrfFeature::Stations | GrfFeature::GlobalVars | GrfFeature::Sounds => None,
        _ => {
            ctx.diag.warn(format!(
                "FeatureChangeInfo: Unsupported feature 0x{feature_id:02X}, skipping"
            ));
            return Ok(());
        }
    };
    if let Some(limit) = limit {
        if first + count > limit {
            ctx.diag.warn(format!(
                "FeatureChangeInfo: Last id {} out of bounds (max {limit}), skipping",
                first + count
            ));
            return Ok(());
        }
    }

    for _ in 0..num_props {
        if !buf.has_more() {
            break;
        }
        let prop = buf.read_u8()?;
        let outcome = apply_property(ctx, feature, first, count, prop, buf)?;
        match outcome {
            PropertyOutcome::Applied => {}
            PropertyOutcome::Ignored => ctx.diag.notice(format!(
                "FeatureChangeInfo: Ignoring property 0x{prop:02X} of feature 0x{feature_id:02X} (not implemented)"
            )),
            PropertyOutcome::Unknown => {
                ctx.diag.warn(format!(
                    "FeatureChangeInfo: Unknown property 0x{prop:02X} of feature 0x{feature_id:02X}, skipping rest of record"
                ));
                break;
            }
        }
    }
    Ok(())
}

fn apply_property(
    ctx: &mut Context<'_>,
    feature: GrfFeature,
    first: usize,
    count: usize,
    prop: u8,
    buf: &mut ByteReader<'_>,
) -> Result<PropertyOutcome> {
    let file = &mut ctx.registry[ctx.file];
    let data = &mut *ctx.data;
    let diag = &mut *ctx.diag;
    match feature {
        GrfFeature::Stations => station::change_info(file, first, count, prop, buf, diag),
        GrfFeature::Bridges => bridge::change_info(&mut data.bridges, first, count, prop, buf, diag),
        GrfFeature::GlobalVars => {
            globals::change_info(&mut data.globals, file, first, count, prop, buf, diag)
        }
        GrfFeature::Sounds => sound::change_info(
            &mut data.sounds,
            file.sound_offset..file.sound_offset + file.num_sounds,
            first,
            count,
            prop,
            buf,
            diag,
        ),
        _ => match feature.vehicle_type() {
            Some(vtype) => data.vehicles.change_info(vtype, first, count, prop, buf, diag),
            None => Ok(PropertyOutcome::Unknown),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::actions::testing::Harness;
    use crate::diagnostics::Severity;
    use crate::features::sound::{SoundEntry, SoundSource};
    use crate::vars::LoadStage;

    #[test]
    fn speed_sentinel_over_two_engines() {
        let mut h = Harness::new(LoadStage::Apply);
        h.run(&[0x00, 0x00, 0x01, 0x02, 0x05, 0x09, 100, 0, 0xFF, 0xFF])
            .unwrap();
        assert_eq!(h.data.vehicles.rail[5].max_speed, 100);
        assert_eq!(h.data.vehicles.rail[6].max_speed, 0);
    }

    #[test]
    fn several_properties_in_one_record() {
        let mut h = Harness::new(LoadStage::Apply);
        // Reliability decay (common, byte) then cost factor (rail, byte).
        h.run(&[0x00, 0x00, 0x02, 0x01, 0x03, 0x02, 0x14, 0x17, 0x30])
            .unwrap();
        assert_eq!(h.data.vehicles.engines[3].decay_speed, 0x14);
        assert_eq!(h.data.vehicles.rail[3].base_cost, 0x30);
    }

    #[test]
    fn unknown_property_stops_the_record() {
        let mut h = Harness::new(LoadStage::Apply);
        h.run(&[0x00, 0x00, 0x02, 0x01, 0x00, 0x7F, 0x09, 0x10, 0x00])
            .unwrap();
        assert_eq!(h.data.vehicles.rail[0].max_speed, 0);
        assert!(h.diag.contains("Unknown property 0x7F"));
    }

    #[test]
    fn out_of_range_engines_are_rejected() {
        let mut h = Harness::new(LoadStage::Apply);
        h.run(&[0x00, 0x02, 0x01, 0x02, 10, 0x08, 1, 2]).unwrap();
        assert!(h.diag.contains("out of bounds"));
    }

    #[test]
    fn bridges_and_sounds_route_to_their_tables() {
        let mut h = Harness::new(LoadStage::Apply);
        h.run(&[0x00, 0x06, 0x01, 0x01, 0x02, 0x0C, 0x20, 0x01]).unwrap();
        assert_eq!(h.data.bridges[2].speed, 0x120);

        h.run(&[0x11, 0x01, 0x00]).unwrap();
        h.run(&[0x00, 0x0C, 0x01, 0x01, 73, 0x09, 7]).unwrap();
        let offset = h.file().sound_offset;
        assert_eq!(h.data.sounds[offset].priority, 7);
    }

    #[test]
    fn sound_properties_stay_inside_the_own_table() {
        let mut h = Harness::new(LoadStage::Apply);
        h.run(&[0x00, 0x0C, 0x01, 0x01, 73, 0x09, 7]).unwrap();
        assert_eq!(h.data.sounds[0].priority, 0);
        assert_eq!(h.diag.count(Severity::Warning), 1);

        h.run(&[0x11, 0x01, 0x00]).unwrap();
        // The next file's sound sits right after ours.
        h.data.sounds.push(SoundEntry::new(SoundSource::Empty));
        h.run(&[0x00, 0x0C, 0x01, 0x01, 74, 0x09, 9]).unwrap();
        let offset = h.file().sound_offset;
        assert_eq!(h.data.sounds[offset + 1].priority, 0);
        assert_eq!(h.diag.count(Severity::Warning), 2);
    }

    #[test]
    fn short_record_is_an_error() {
        let mut h = Harness::new(LoadStage::Apply);
        assert!(h.run(&[0x00, 0x00, 0x01]).is_err());
    }
}
