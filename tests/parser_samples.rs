use rpipinout::parser::{parse_output, BankGrouping, PinStatus};

const FULL_REPLAY: &str = "\
BANK0 (GPIO 0 to 27):\n\
GPIO 0: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 1: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 2: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 3: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 4: level=1 fsel=0 func=INPUT pull=NONE\n\
GPIO 5: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 6: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 7: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 8: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 9: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 10: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 11: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 12: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 13: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 14: level=1 fsel=0 func=INPUT pull=NONE\n\
GPIO 15: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 16: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 17: level=0 fsel=1 func=OUTPUT pull=DOWN\n\
GPIO 18: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 19: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 20: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 21: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 22: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 23: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 24: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 25: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 26: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 27: level=0 fsel=0 func=INPUT pull=DOWN\n\
BANK1 (GPIO 28 to 45):\n\
GPIO 28: level=1 fsel=2 alt=5 func=RGMII_MDIO pull=UP\n\
GPIO 29: level=0 fsel=2 alt=5 func=RGMII_MDC pull=DOWN\n\
GPIO 30: level=0 fsel=7 alt=3 func=CTS0 pull=UP\n\
GPIO 31: level=0 fsel=7 alt=3 func=RTS0 pull=NONE\n\
GPIO 32: level=1 fsel=7 alt=3 func=TXD0 pull=NONE\n\
GPIO 33: level=1 fsel=7 alt=3 func=RXD0 pull=UP\n\
GPIO 34: level=1 fsel=7 alt=3 func=SD1_CLK pull=NONE\n\
GPIO 35: level=1 fsel=7 alt=3 func=SD1_CMD pull=UP\n\
GPIO 36: level=1 fsel=7 alt=3 func=SD1_DAT0 pull=UP\n\
GPIO 37: level=1 fsel=7 alt=3 func=SD1_DAT1 pull=UP\n\
GPIO 38: level=1 fsel=7 alt=3 func=SD1_DAT2 pull=UP\n\
GPIO 39: level=1 fsel=7 alt=3 func=SD1_DAT3 pull=UP\n\
GPIO 40: level=0 fsel=4 alt=0 func=PWM1_0 pull=NONE\n\
GPIO 41: level=0 fsel=4 alt=0 func=PWM1_1 pull=NONE\n\
GPIO 42: level=0 fsel=1 func=OUTPUT pull=UP\n\
GPIO 43: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 44: level=1 fsel=0 func=INPUT pull=UP\n\
GPIO 45: level=1 fsel=0 func=INPUT pull=UP\n\
BANK2 (GPIO 46 to 53):\n\
GPIO 46: level=0 fsel=0 func=INPUT pull=UP\n\
GPIO 47: level=0 fsel=0 func=INPUT pull=UP\n\
GPIO 48: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 49: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 50: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 51: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 52: level=0 fsel=0 func=INPUT pull=DOWN\n\
GPIO 53: level=0 fsel=0 func=INPUT pull=DOWN";

fn parse(text: &str) -> BankGrouping {
    parse_output(text).expect("failed to parse sample")
}

#[test]
fn full_replay_groups_all_three_banks() {
    let banks = parse(FULL_REPLAY);

    assert_eq!(banks.keys().copied().collect::<Vec<_>>(), vec![Some(0), Some(1), Some(2)]);
    assert_eq!(banks[&Some(0)].len(), 28);
    assert_eq!(banks[&Some(1)].len(), 18);
    assert_eq!(banks[&Some(2)].len(), 8);
}

#[test]
fn full_replay_keeps_pin_order_within_bank() {
    let banks = parse(FULL_REPLAY);
    for (bank, first) in [(0, 0), (1, 28), (2, 46)] {
        let gpios: Vec<u32> = banks[&Some(bank)].iter().map(|p| p.gpio).collect();
        let expected: Vec<u32> = (first..first + gpios.len() as u32).collect();
        assert_eq!(gpios, expected, "bank {bank}");
    }
}

#[test]
fn full_replay_reads_alternate_functions() {
    let banks = parse(FULL_REPLAY);
    let bank1 = &banks[&Some(1)];

    assert_eq!(
        bank1[0],
        PinStatus {
            gpio: 28,
            level: 1,
            fsel: 2,
            function: "RGMII_MDIO".into(),
            pull: "UP".into(),
        }
    );
    let pwm = bank1.iter().find(|p| p.gpio == 41).unwrap();
    assert_eq!(pwm.fsel, 4);
    assert_eq!(pwm.function, "PWM1_1");
    assert_eq!(pwm.pull, "NONE");

    let out17 = banks[&Some(0)].iter().find(|p| p.gpio == 17).unwrap();
    assert_eq!((out17.level, out17.fsel, out17.function.as_str()), (0, 1, "OUTPUT"));
}

#[test]
fn filtered_replay_without_headers_uses_sentinel_group() {
    let text = "GPIO 0: level=1 fsel=0 func=INPUT pull=UP\n\
                GPIO 29: level=0 fsel=2 alt=5 func=RGMII_MDC pull=DOWN\n\
                GPIO 38: level=1 fsel=7 alt=3 func=SD1_DAT2 pull=UP";
    let banks = parse(text);

    assert_eq!(banks.len(), 1);
    let pins = &banks[&None];
    assert_eq!(pins.iter().map(|p| p.gpio).collect::<Vec<_>>(), vec![0, 29, 38]);
    assert_eq!(pins[2].function, "SD1_DAT2");
    assert_eq!(pins[2].fsel, 7);
}
