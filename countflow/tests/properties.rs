use countflow::*;
use itertools::iproduct;

/// Builds an input carrying exactly the ports `config` declares.
fn input_for(config: &ValidatedConfig, down: bool, inc: u64, wrap: bool, change: bool, reset: bool) -> CounterInput {
    let count_max = config.count_max();
    CounterInput {
        up_down: config.has_up_down().then_some(down),
        inc: config.has_inc().then_some(inc.min(config.inc_max())),
        wrap_to: config.has_wrap_to().then_some(count_max / 2),
        max: config.has_max().then_some(count_max),
        mod_n: config.has_mod_n().then_some(count_max),
        ctrl: CtrlIn {
            wrap: config.has_wrap_ctrl().then_some(wrap),
            change: config.has_change_ctrl().then_some(change),
            reset,
        },
    }
}

fn valid_configs() -> Vec<ValidatedConfig> {
    let locs = [CtrlLoc::External, CtrlLoc::Internal, CtrlLoc::TieFalse, CtrlLoc::TieTrue];
    let types = [CountType::Up, CountType::Down, CountType::UpDown, CountType::UpMod];
    iproduct!(locs, locs, types, [false, true], [1, 2, 5], [0, 3])
        .filter_map(|(wrap, change, count_type, custom_wrap, inc_max, reset_val)| {
            CounterConfig::new(11)
                .wrap_ctrl(wrap)
                .change_ctrl(change)
                .count_type(count_type)
                .custom_wrap(custom_wrap)
                .inc_max(inc_max)
                .reset_val(reset_val)
                .validate()
                .ok()
        })
        .collect()
}

#[test]
fn reset_has_absolute_priority() {
    let configs = valid_configs();
    assert!(!configs.is_empty());

    for config in configs {
        for (count, down, inc, wrap, change) in iproduct!([0, 5, 11], [false, true], [0, 1, 5], [false, true], [false, true])
        {
            let input = input_for(&config, down, inc, wrap, change, true);
            Ports::new(&config).check(&input).unwrap();
            let (output, next) = config.transition(&input, &count);
            assert_eq!(next, config.reset_val(), "{config:?} {input:?}");
            assert_eq!(output.out, count);
            assert!(output.ctrl.reset);
        }
    }
}

#[test]
fn control_outputs_mirror_control_inputs() {
    for config in valid_configs() {
        let input = input_for(&config, false, 1, true, true, false);
        let (output, _) = config.transition(&input, &3);
        assert_eq!(output.ctrl.shape(), input.ctrl.shape(), "{config:?}");
        assert_eq!(output.ctrl.shape(), Ports::new(&config).ctrl_out_shape());
    }
}

#[test]
fn up_counter_wraps_at_max() {
    let config = CounterConfig::new(7).validate().unwrap();
    let (output, next) = config.transition(&CounterInput::new(CtrlIn::reset(false)).max(7), &7);
    assert_eq!(next, 0);
    assert_eq!(output.ctrl, CtrlOut { wrap: None, change: None, reset: false });
}

#[test]
fn up_down_counter_wraps_in_both_directions() {
    let config = CounterConfig::new(7).count_type(CountType::UpDown).validate().unwrap();
    let idle = CtrlIn::reset(false);

    let (_, next) = config.transition(&CounterInput::new(idle).up_down(true).max(7), &0);
    assert_eq!(next, 7);
    let (_, next) = config.transition(&CounterInput::new(idle).up_down(false).max(7), &7);
    assert_eq!(next, 0);
}

#[test]
fn modulo_counter_overflows() {
    let config = CounterConfig::new(7).count_type(CountType::UpMod).validate().unwrap();
    let mut counter = Counter::new(config);
    let input = CounterInput::new(CtrlIn::reset(false)).mod_n(5);

    let outs = (0..7).map(|_| counter.step(&input).unwrap().out).collect::<Vec<_>>();
    assert_eq!(outs, [0, 1, 2, 3, 4, 0, 1]);
}

#[test]
fn holding_change_low_keeps_the_count() {
    for config in valid_configs().into_iter().filter(ValidatedConfig::has_change_ctrl) {
        let mut counter = Counter::new(config);
        let start = counter.count();
        for (down, wrap) in iproduct!([false, true], [false, true]) {
            let input = input_for(&config, down, config.inc_max(), wrap, false, false);
            let output = counter.step(&input).unwrap();
            assert_eq!(output.out, start);
            assert_eq!(counter.count(), start, "{config:?}");
            assert_eq!(output.ctrl.change, Some(false));
        }
    }
}

#[test]
fn full_cycle_returns_to_reset_value() {
    for (count_max, reset_val) in [(1, 0), (1, 1), (7, 0), (7, 5), (12, 12), (255, 100)] {
        let config = CounterConfig::new(count_max).reset_val(reset_val).validate().unwrap();
        let mut counter = Counter::new(config);
        let input = CounterInput::new(CtrlIn::reset(false)).max(config.count_max());

        let mut seen = Vec::new();
        for _ in 0..=count_max {
            seen.push(counter.step(&input).unwrap().out);
        }
        assert_eq!(counter.count(), config.reset_val());
        seen.sort_unstable();
        assert_eq!(seen, (0..=config.count_max()).collect::<Vec<_>>());
    }
}

#[test]
fn count_stays_in_range_for_wrapping_counters() {
    let wrapping = valid_configs()
        .into_iter()
        .filter(|config| config.wrap_ctrl() == WrapCtrl::Internal && !config.custom_wrap());

    for config in wrapping {
        let mut counter = Counter::new(config);
        for step in 0..40 {
            let input = input_for(&config, step % 3 == 0, 1 + step % 2, false, true, false);
            counter.step(&input).unwrap();
            assert!(counter.count() <= config.count_max(), "{config:?}");
        }
    }
}
