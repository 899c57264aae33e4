//! Field tables for every subsystem that appears in a beacon.
//!
//! Generation 1 scale factors are the calibration constants from the
//! subsystem datasheets and must stay exactly as written here.

use super::{BitField, FieldSpec, Schema};

/// Absolute zero, for sensors that report Kelvin.
const KELVIN: f64 = -273.15;

// ADC counts, 12-bit over 3V reference
const ADC_3V: f64 = 3.0 / 4096.0;

/// Electrical power system.
pub const EPS: Schema = Schema {
    name: "eps",
    length: 116,
    fields: &[
        FieldSpec::uint("eps_output_current_bcr", 2).scaled(14.662757),
        FieldSpec::uint("eps_output_voltage_bcr", 2).scaled(0.008993157),
        FieldSpec::uint("eps_output_current_12v", 2).scaled(0.00207),
        FieldSpec::uint("eps_output_voltage_12v", 2).scaled(0.01349),
        FieldSpec::uint("eps_output_current_bat", 2).scaled(0.005237),
        FieldSpec::uint("eps_output_voltage_bat", 2).scaled(0.008978),
        FieldSpec::uint("eps_output_current_5v", 2).scaled(0.005237),
        FieldSpec::uint("eps_output_voltage_5v", 2).scaled(0.005865),
        FieldSpec::uint("eps_output_current_3v3", 2).scaled(0.005237),
        FieldSpec::uint("eps_output_voltage_3v3", 2).scaled(0.004311),
        FieldSpec::uint("eps_temperature_motherboard", 2).affine(0.372434, KELVIN),
        FieldSpec::uint("eps_temperature_daughterboard", 2).affine(0.372434, KELVIN),
        FieldSpec::uint("eps_currentdraw_3v3", 2).scaled(0.001327547),
        FieldSpec::uint("eps_currentdraw_5v", 2).scaled(0.001327547),
        FieldSpec::uint("eps_switchbus_voltage_motor", 2).scaled(0.01349),
        FieldSpec::uint("eps_switchbus_current_motor", 2).scaled(0.001328),
        FieldSpec::uint("eps_switchbus_voltage_hstx", 2).scaled(0.008993),
        FieldSpec::uint("eps_switchbus_current_hstx", 2).scaled(0.006239),
        FieldSpec::uint("eps_switchbus_voltage_camera", 2).scaled(0.005865),
        FieldSpec::uint("eps_switchbus_current_camera", 2).scaled(0.001328),
        FieldSpec::uint("eps_switchbus_voltage_adac5", 2).scaled(0.005865),
        FieldSpec::uint("eps_switchbus_current_adac5", 2).scaled(0.001328),
        FieldSpec::uint("eps_switchbus_voltage_vlf", 2).scaled(0.005865),
        FieldSpec::uint("eps_switchbus_current_vlf", 2).scaled(0.001328),
        FieldSpec::uint("eps_switchbus_voltage_ants", 2).scaled(0.004311),
        FieldSpec::uint("eps_switchbus_current_ants", 2).scaled(0.001328),
        FieldSpec::uint("eps_switchbus_voltage_adac3", 2).scaled(0.004311),
        FieldSpec::uint("eps_switchbus_current_adac3", 2).scaled(0.001328),
        FieldSpec::uint("eps_switchbus_voltage_gps", 2).scaled(0.004311),
        FieldSpec::uint("eps_switchbus_current_gps", 2).scaled(0.001328),
        FieldSpec::uint("eps_bcr1_temperature_a", 2).affine(0.4963, KELVIN),
        FieldSpec::uint("eps_bcr1_temperature_b", 2).affine(0.4963, KELVIN),
        FieldSpec::uint("eps_bcr1_voltage", 2).scaled(0.0322581),
        FieldSpec::uint("eps_bcr1_current", 2).scaled(0.0009775),
        FieldSpec::uint("eps_bcr2_temperature_a", 2).affine(0.4963, KELVIN),
        FieldSpec::uint("eps_bcr2_temperature_b", 2).affine(0.4963, KELVIN),
        FieldSpec::uint("eps_bcr2_voltage", 2).scaled(0.0322581),
        FieldSpec::uint("eps_bcr2_current_a", 2).scaled(0.0009775),
        FieldSpec::uint("eps_bcr2_current_b", 2).scaled(0.0009775),
        FieldSpec::uint("eps_bcr3_temperature_a", 2).affine(0.4963, KELVIN),
        FieldSpec::uint("eps_bcr3_temperature_b", 2).affine(0.4963, KELVIN),
        FieldSpec::uint("eps_bcr3_voltage", 2).scaled(0.0099706),
        FieldSpec::uint("eps_bcr3_current_a", 2).scaled(0.0009775),
        FieldSpec::uint("eps_bcr3_current_b", 2).scaled(0.0009775),
        FieldSpec::uint("eps_bcr4_voltage", 2).scaled(0.0322581),
        FieldSpec::uint("eps_bcr4_current_a", 2).scaled(0.0009775),
        FieldSpec::uint("eps_bcr4_current_b", 2).scaled(0.0009775),
        FieldSpec::uint("eps_bcr6_voltage", 2).scaled(0.0322581),
        FieldSpec::uint("eps_bcr6_current_a", 2).scaled(0.0009775),
        FieldSpec::uint("eps_bcr6_current_b", 2).scaled(0.0009775),
        FieldSpec::bits(
            2,
            &[
                BitField::flag("eps_pdmstate_vlf_12v", 1),
                BitField::flag("eps_pdmstate_stx_bat", 3),
                BitField::flag("eps_pdmstate_camera", 5),
                BitField::flag("eps_pdmstate_adac_5v", 6),
                BitField::flag("eps_pdmstate_vlf_5v", 7),
                BitField::flag("eps_pdmstate_ants", 8),
                BitField::flag("eps_pdmstate_adac_3v3", 9),
                BitField::flag("eps_pdmstate_gps_3v3", 10),
            ],
        ),
        FieldSpec::uint("eps_reset_brownout_motherboard", 2),
        FieldSpec::uint("eps_reset_brownout_daughterboard", 2),
        FieldSpec::uint("eps_reset_software_motherboard", 2),
        FieldSpec::uint("eps_reset_software_daughterboard", 2),
        FieldSpec::uint("eps_reset_manual_motherboard", 2),
        FieldSpec::uint("eps_reset_manual_daughterboard", 2),
        FieldSpec::uint("eps_reset_watchdog", 2),
    ],
};

/// Battery pack.
pub const BATTERY: Schema = Schema {
    name: "battery",
    length: 15,
    fields: &[
        FieldSpec::uint("battery_voltage", 2).scaled(0.008993),
        FieldSpec::uint("battery_current", 2).scaled(14.662757 / 1000.0),
        FieldSpec::uint("battery_temperature_motherboard", 2).affine(0.372434, KELVIN),
        FieldSpec::uint("battery_temperature_daughterboard_1", 2).affine(0.3976, -238.57),
        FieldSpec::uint("battery_temperature_daughterboard_2", 2).affine(0.3976, -238.57),
        FieldSpec::uint("battery_temperature_daughterboard_3", 2).affine(0.3976, -238.57),
        FieldSpec::uint("battery_temperature_daughterboard_4", 2).affine(0.3976, -238.57),
        FieldSpec::bits(
            1,
            &[
                BitField::flag("battery_heaterstatus_1", 0),
                BitField::flag("battery_heaterstatus_2", 1),
                BitField::flag("battery_heaterstatus_3", 2),
                BitField::flag("battery_heaterstatus_4", 3),
            ],
        ),
    ],
};

/// VHF/UHF transceiver.
pub const VUTRX: Schema = Schema {
    name: "vutrx",
    length: 28,
    fields: &[
        FieldSpec::uint("vutrx_rx_failedpackage", 1),
        FieldSpec::uint("vutrx_rx_crcfailedpackage", 2),
        FieldSpec::uint("vutrx_rx_packagecounter", 2),
        FieldSpec::bits(
            1,
            &[
                BitField::slice("vutrx_rx_frequentlock", 0, 1),
                BitField::slice("vutrx_tx_frequentlock", 1, 1),
            ],
        ),
        FieldSpec::uint("vutrx_rssi", 2).scaled(ADC_3V),
        FieldSpec::int("vutrx_smps_temperature", 1),
        FieldSpec::int("vutrx_poweramplifier_temperature", 1),
        FieldSpec::uint("vutrx_poweramplifier_power", 1),
        FieldSpec::uint("vutrx_frequencyoffset_tx", 2),
        FieldSpec::uint("vutrx_frequencyoffset_rx", 2),
        FieldSpec::bits(
            1,
            &[
                BitField::slice("vutrx_dtmf_tone", 0, 4),
                BitField::slice("vutrx_dtmf_counter", 4, 4),
            ],
        ),
        FieldSpec::int("vutrx_current_3v3", 2).scaled(3e-6),
        FieldSpec::int("vutrx_current_5v", 2).scaled(62e-6),
        FieldSpec::int("vutrx_voltage_3v3", 2).scaled(4e-3),
        FieldSpec::int("vutrx_voltage_5v", 2).scaled(4e-3),
        FieldSpec::uint("vutrx_poweramplifier_forwardpower", 2).scaled(ADC_3V),
        FieldSpec::uint("vutrx_poweramplifier_reversepower", 2).scaled(ADC_3V),
    ],
};

/// Antenna deployment system.
pub const ANTS: Schema = Schema {
    name: "ants",
    length: 4,
    fields: &[
        FieldSpec::uint("ants_temperature", 2).scaled(3.3 / 1023.0),
        FieldSpec::bits(
            2,
            &[
                BitField::flag("ants_status_armed", 0),
                BitField::flag("ants_status_deploymentactive_4", 1),
                BitField::flag("ants_status_stopcriteria_4", 2),
                BitField::flag("ants_status_deploymentflag_4", 3),
                BitField::flag("ants_status_independentburn", 4),
                BitField::flag("ants_status_deploymentactive_3", 5),
                BitField::flag("ants_status_stopcriteria_3", 6),
                BitField::flag("ants_status_deploymentflag_3", 7),
                BitField::flag("ants_status_ignoreswitches", 8),
                BitField::flag("ants_status_deploymentactive_2", 9),
                BitField::flag("ants_status_stopcriteria_2", 10),
                BitField::flag("ants_status_deploymentflag_2", 11),
                BitField::flag("ants_status_deploymentactive_1", 13),
                BitField::flag("ants_status_stopcriteria_1", 14),
                BitField::flag("ants_status_deploymentflag_1", 15),
            ],
        ),
    ],
};

/// S-band transmitter.
pub const STX: Schema = Schema {
    name: "stx",
    length: 22,
    fields: &[
        FieldSpec::uint("stx_voltage_battery", 2).scaled(4e-3),
        FieldSpec::uint("stx_current_battery", 2).scaled(40e-6),
        FieldSpec::uint("stx_voltage_poweramplifier", 2).scaled(4e-3),
        FieldSpec::uint("stx_current_poweramplifier", 2).scaled(40e-6),
        // 12-bit two's complement, in the top of the register
        FieldSpec::bits(
            2,
            &[BitField::slice("stx_temperature_top", 4, 12)
                .signed()
                .scaled(0.0625)],
        ),
        FieldSpec::bits(
            2,
            &[BitField::slice("stx_temperature_bottom", 4, 12)
                .signed()
                .scaled(0.0625)],
        ),
        FieldSpec::uint("stx_temperature_poweramplifier", 1).affine(ADC_3V * 100.0, -50.0),
        FieldSpec::uint("stx_synth_offset", 1).affine(0.5, 2400.0),
        FieldSpec::uint("stx_buffer_overrun", 2),
        FieldSpec::uint("stx_buffer_underrun", 2),
        FieldSpec::bits(
            1,
            &[
                BitField::flag("stx_poweramplifier_status_frequencylock", 0),
                BitField::flag("stx_poweramplifier_status_powergood", 1),
            ],
        ),
        FieldSpec::uint("stx_rf_poweroutput", 2).scaled(3.0 * 28.0 / 4096.0 / 18.0),
        FieldSpec::padding(1),
    ],
};

/// Command and data handling computer. Only sent by generation 2
/// firmware.
///
/// No datasheet covers this layout. Fields and scales are defined here
/// and may need updating once real generation 2 frames are seen.
pub const CDH: Schema = Schema {
    name: "cdh",
    length: 24,
    fields: &[
        FieldSpec::uint("cdh_uptime", 4),
        FieldSpec::uint("cdh_boot_count", 2),
        FieldSpec::uint("cdh_reset_cause", 1),
        FieldSpec::uint("cdh_mode", 1),
        FieldSpec::uint("cdh_command_counter", 2),
        FieldSpec::uint("cdh_last_command", 1),
        FieldSpec::uint("cdh_command_errors", 1),
        FieldSpec::uint("cdh_rtc_time", 4),
        FieldSpec::int("cdh_temperature_obc", 2).scaled(0.01),
        FieldSpec::uint("cdh_storage_used", 3),
        FieldSpec::uint("cdh_image_count", 1),
        FieldSpec::bits(
            1,
            &[
                BitField::flag("cdh_payload_power_vlf", 0),
                BitField::flag("cdh_payload_power_camera", 1),
                BitField::flag("cdh_payload_power_hstx", 2),
                BitField::flag("cdh_payload_power_gps", 3),
                BitField::flag("cdh_beacon_enabled", 6),
                BitField::flag("cdh_deployment_complete", 7),
            ],
        ),
        FieldSpec::padding(1),
    ],
};

/// Attitude determination and control. Only sent by generation 2
/// firmware.
///
/// Defined here like [CDH], not taken from a datasheet.
pub const ADCS: Schema = Schema {
    name: "adcs",
    length: 71,
    fields: &[
        FieldSpec::uint("adcs_mode", 1),
        FieldSpec::bits(
            1,
            &[
                BitField::flag("adcs_status_sun_visible", 0),
                BitField::flag("adcs_status_mag_valid", 1),
                BitField::flag("adcs_status_gyro_valid", 2),
                BitField::flag("adcs_status_detumbled", 3),
            ],
        ),
        FieldSpec::float32("adcs_quaternion_q0"),
        FieldSpec::float32("adcs_quaternion_q1"),
        FieldSpec::float32("adcs_quaternion_q2"),
        FieldSpec::float32("adcs_quaternion_q3"),
        FieldSpec::float32("adcs_rate_x"),
        FieldSpec::float32("adcs_rate_y"),
        FieldSpec::float32("adcs_rate_z"),
        FieldSpec::int("adcs_magnetometer_x", 2).scaled(0.01),
        FieldSpec::int("adcs_magnetometer_y", 2).scaled(0.01),
        FieldSpec::int("adcs_magnetometer_z", 2).scaled(0.01),
        FieldSpec::int("adcs_sun_vector_x", 2).scaled(1.0 / 32767.0),
        FieldSpec::int("adcs_sun_vector_y", 2).scaled(1.0 / 32767.0),
        FieldSpec::int("adcs_sun_vector_z", 2).scaled(1.0 / 32767.0),
        FieldSpec::float64("adcs_position_x"),
        FieldSpec::float64("adcs_position_y"),
        FieldSpec::float64("adcs_position_z"),
        FieldSpec::int("adcs_torquer_duty_x", 1).scaled(100.0 / 127.0),
        FieldSpec::int("adcs_torquer_duty_y", 1).scaled(100.0 / 127.0),
        FieldSpec::int("adcs_torquer_duty_z", 1).scaled(100.0 / 127.0),
        FieldSpec::padding(2),
    ],
};

/// Every schema, for table checks.
pub const ALL: &[&Schema] = &[&EPS, &BATTERY, &VUTRX, &ANTS, &STX, &CDH, &ADCS];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lengths_match_fields() {
        for schema in ALL {
            assert_eq!(schema.field_width(), schema.length, "{}", schema.name);
        }
    }

    #[test]
    fn names_unique() {
        let mut names: Vec<_> = ALL.iter().flat_map(|s| s.outputs()).collect();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn names_prefixed() {
        for schema in ALL {
            for name in schema.outputs() {
                assert!(name.starts_with(schema.name), "{}", name);
            }
        }
    }

    #[test]
    fn output_counts() {
        let count = |s: &Schema| s.outputs().count();
        assert_eq!(count(&EPS), 65);
        assert_eq!(count(&BATTERY), 11);
        assert_eq!(count(&VUTRX), 19);
        assert_eq!(count(&ANTS), 16);
        assert_eq!(count(&STX), 13);
    }
}
