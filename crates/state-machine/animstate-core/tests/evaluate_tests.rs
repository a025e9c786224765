use animstate_core::{
    compile, evaluate, ActiveTransition, CompileError, ConditionDesc, ConditionTestDesc, GraphDesc,
    IntOp, InterruptPolicy, ParamDesc, ParamSet, ParamType, ParamValue, Playback, StateDesc,
    StateIx, StateKindDesc, StateMachineBlob, TransitionChoice, TransitionDesc,
};
use std::sync::Arc;

fn clip(name: &str, length: f32, looping: bool) -> StateDesc {
    StateDesc {
        name: name.into(),
        kind: StateKindDesc::Clip,
        speed: 1.0,
        looping,
        length,
        transitions: Vec::new(),
    }
}

fn to(dest: &str, duration: f32) -> TransitionDesc {
    TransitionDesc {
        to: dest.into(),
        duration,
        exit_time: None,
        conditions: Vec::new(),
    }
}

fn bool_cond(param: &str, equals: bool) -> ConditionDesc {
    ConditionDesc {
        param: param.into(),
        test: ConditionTestDesc::Bool { equals },
    }
}

fn int_cond(param: &str, op: IntOp, value: i32) -> ConditionDesc {
    ConditionDesc {
        param: param.into(),
        test: ConditionTestDesc::Int { op, value },
    }
}

fn param(name: &str, ty: ParamType) -> ParamDesc {
    ParamDesc {
        name: name.into(),
        ty,
        default: None,
    }
}

fn build(g: &GraphDesc) -> Arc<StateMachineBlob> {
    compile(g).unwrap_or_else(|e: CompileError| panic!("fixture graph should compile: {e}"))
}

fn playing(state: StateIx, time: f32) -> Playback {
    Playback {
        current: state,
        time,
        active: None,
    }
}

fn set_bool(blob: &StateMachineBlob, params: &mut ParamSet, name: &str, v: bool) {
    params.set(blob.param_index(name).unwrap(), ParamValue::Bool(v));
}

fn set_int(blob: &StateMachineBlob, params: &mut ParamSet, name: &str, v: i32) {
    params.set(blob.param_index(name).unwrap(), ParamValue::Int(v));
}

/// Idle/Run pair with a conditioned Idle->Run transition, plus an optional
/// any-state list supplied by the caller.
fn idle_run_graph(any_state: Vec<TransitionDesc>) -> GraphDesc {
    let mut idle = clip("Idle", 1.0, true);
    let mut t = to("Run", 0.2);
    t.conditions.push(bool_cond("Moving", true));
    idle.transitions.push(t);
    GraphDesc {
        name: "eval".into(),
        default_state: "Idle".into(),
        parameters: vec![
            param("Moving", ParamType::Bool),
            param("Health", ParamType::Int),
        ],
        states: vec![idle, clip("Run", 0.8, true), clip("Hit", 0.5, false)],
        any_state,
    }
}

#[test]
fn no_eligible_transition_returns_none() {
    let blob = build(&idle_run_graph(Vec::new()));
    let params = ParamSet::from_blob(&blob);
    let pb = playing(blob.default_state, 0.0);
    assert_eq!(evaluate(&blob, &pb, &params, InterruptPolicy::Never), None);
}

#[test]
fn first_eligible_per_state_transition_wins() {
    let blob = build(&idle_run_graph(Vec::new()));
    let mut params = ParamSet::from_blob(&blob);
    set_bool(&blob, &mut params, "Moving", true);
    let pb = playing(blob.default_state, 0.0);
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::Never),
        Some(TransitionChoice::PerState(0))
    );
}

#[test]
fn earlier_any_state_entry_wins_over_later() {
    // Two any-state transitions, both eligible; declared order decides.
    let mut first = to("Run", 0.1);
    first.conditions.push(int_cond("Health", IntOp::Less, 50));
    let mut second = to("Hit", 0.1);
    second.conditions.push(int_cond("Health", IntOp::Less, 50));
    let blob = build(&idle_run_graph(vec![first, second]));
    let mut params = ParamSet::from_blob(&blob);
    set_int(&blob, &mut params, "Health", 10);
    let pb = playing(blob.default_state, 0.0);
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::Never),
        Some(TransitionChoice::AnyState(0))
    );
}

#[test]
fn any_state_beats_eligible_per_state_transition() {
    let mut hit = to("Hit", 0.1);
    hit.conditions.push(int_cond("Health", IntOp::Less, 20));
    let blob = build(&idle_run_graph(vec![hit]));
    let mut params = ParamSet::from_blob(&blob);
    // Both the per-state Idle->Run and the any-state ->Hit are eligible.
    set_bool(&blob, &mut params, "Moving", true);
    set_int(&blob, &mut params, "Health", 10);
    let pb = playing(blob.default_state, 0.0);
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::Never),
        Some(TransitionChoice::AnyState(0))
    );
}

#[test]
fn exit_time_gates_until_threshold() {
    let mut run = clip("Run", 0.8, true);
    let mut t = to("Idle", 0.2);
    t.exit_time = Some(0.5);
    run.transitions.push(t);
    let g = GraphDesc {
        name: "gate".into(),
        default_state: "Run".into(),
        parameters: Vec::new(),
        states: vec![run, clip("Idle", 1.0, true)],
        any_state: Vec::new(),
    };
    let blob = build(&g);
    let params = ParamSet::from_blob(&blob);

    // Normalized 0.3 / 0.8 = 0.375 < 0.5: gated.
    let pb = playing(StateIx(0), 0.3);
    assert_eq!(evaluate(&blob, &pb, &params, InterruptPolicy::Never), None);

    // Normalized 0.45 / 0.8 = 0.5625 >= 0.5: eligible.
    let pb = playing(StateIx(0), 0.45);
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::Never),
        Some(TransitionChoice::PerState(0))
    );
}

#[test]
fn any_state_exit_time_uses_current_state_clock() {
    let mut hit = to("Hit", 0.1);
    hit.exit_time = Some(0.5);
    let blob = build(&idle_run_graph(vec![hit]));
    let params = ParamSet::from_blob(&blob);

    // Idle has length 1.0; the gate reads Idle's normalized time.
    let pb = playing(blob.default_state, 0.25);
    assert_eq!(evaluate(&blob, &pb, &params, InterruptPolicy::Never), None);
    let pb = playing(blob.default_state, 0.75);
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::Never),
        Some(TransitionChoice::AnyState(0))
    );
}

#[test]
fn all_conditions_must_hold_simultaneously() {
    // Scenario C: Bool A==true AND Int B>5.
    let mut idle = clip("Idle", 1.0, true);
    let mut t = to("Run", 0.2);
    t.conditions.push(bool_cond("A", true));
    t.conditions.push(int_cond("B", IntOp::Greater, 5));
    idle.transitions.push(t);
    let g = GraphDesc {
        name: "and".into(),
        default_state: "Idle".into(),
        parameters: vec![param("A", ParamType::Bool), param("B", ParamType::Int)],
        states: vec![idle, clip("Run", 0.8, true)],
        any_state: Vec::new(),
    };
    let blob = build(&g);
    let mut params = ParamSet::from_blob(&blob);
    let pb = playing(blob.default_state, 0.0);

    set_bool(&blob, &mut params, "A", true);
    set_int(&blob, &mut params, "B", 3);
    assert_eq!(evaluate(&blob, &pb, &params, InterruptPolicy::Never), None);

    set_bool(&blob, &mut params, "A", false);
    set_int(&blob, &mut params, "B", 10);
    assert_eq!(evaluate(&blob, &pb, &params, InterruptPolicy::Never), None);

    set_bool(&blob, &mut params, "A", true);
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::Never),
        Some(TransitionChoice::PerState(0))
    );
}

#[test]
fn int_comparators_cover_all_ops() {
    for (op, value, health, expect) in [
        (IntOp::Equal, 10, 10, true),
        (IntOp::Equal, 10, 11, false),
        (IntOp::NotEqual, 10, 11, true),
        (IntOp::NotEqual, 10, 10, false),
        (IntOp::Greater, 10, 11, true),
        (IntOp::Greater, 10, 10, false),
        (IntOp::Less, 10, 9, true),
        (IntOp::Less, 10, 10, false),
    ] {
        let mut hit = to("Hit", 0.1);
        hit.conditions.push(int_cond("Health", op, value));
        let blob = build(&idle_run_graph(vec![hit]));
        let mut params = ParamSet::from_blob(&blob);
        set_int(&blob, &mut params, "Health", health);
        let pb = playing(blob.default_state, 0.0);
        let got = evaluate(&blob, &pb, &params, InterruptPolicy::Never);
        assert_eq!(got.is_some(), expect, "{op:?} {value} vs {health}");
    }
}

#[test]
fn any_state_may_target_the_current_state() {
    // Self-restart: the any-state transition targets Idle while Idle plays.
    let mut restart = to("Idle", 0.1);
    restart.conditions.push(bool_cond("Moving", true));
    let blob = build(&idle_run_graph(vec![restart]));
    let mut params = ParamSet::from_blob(&blob);
    set_bool(&blob, &mut params, "Moving", true);
    let pb = playing(blob.default_state, 0.4);
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::Never),
        Some(TransitionChoice::AnyState(0))
    );
}

#[test]
fn any_state_toward_active_target_does_not_retrigger() {
    let mut hit = to("Hit", 0.3);
    hit.conditions.push(int_cond("Health", IntOp::Less, 20));
    let blob = build(&idle_run_graph(vec![hit]));
    let mut params = ParamSet::from_blob(&blob);
    set_int(&blob, &mut params, "Health", 10);

    // Already blending toward Hit: the matching any-state entry is not an
    // interrupt, so the blend keeps advancing instead of restarting.
    let pb = Playback {
        current: blob.default_state,
        time: 0.1,
        active: Some(ActiveTransition {
            target: StateIx(2),
            duration: 0.3,
            elapsed: 0.1,
            dest_time: 0.1,
        }),
    };
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::AnyState),
        None
    );

    // Blending toward a different state: the same entry interrupts.
    let pb = Playback {
        active: Some(ActiveTransition {
            target: StateIx(1),
            duration: 0.2,
            elapsed: 0.1,
            dest_time: 0.1,
        }),
        ..pb
    };
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::AnyState),
        Some(TransitionChoice::AnyState(0))
    );
}

#[test]
fn in_progress_transition_suppresses_evaluation() {
    let mut hit = to("Hit", 0.1);
    hit.conditions.push(int_cond("Health", IntOp::Less, 20));
    let blob = build(&idle_run_graph(vec![hit]));
    let mut params = ParamSet::from_blob(&blob);
    set_bool(&blob, &mut params, "Moving", true);
    set_int(&blob, &mut params, "Health", 10);

    let pb = Playback {
        current: blob.default_state,
        time: 0.1,
        active: Some(ActiveTransition {
            target: StateIx(1),
            duration: 0.2,
            elapsed: 0.05,
            dest_time: 0.05,
        }),
    };

    // Conservative policy: nothing is evaluated mid-blend.
    assert_eq!(evaluate(&blob, &pb, &params, InterruptPolicy::Never), None);

    // Interrupting policy: the any-state list stays live, the per-state
    // list does not.
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::AnyState),
        Some(TransitionChoice::AnyState(0))
    );
    set_int(&blob, &mut params, "Health", 100);
    assert_eq!(
        evaluate(&blob, &pb, &params, InterruptPolicy::AnyState),
        None
    );
}
