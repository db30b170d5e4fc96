//! Motor control machine driven through the public API.
//!
//! States: Idle, Stop, Start, ChangeSpeed. Events: SetSpeed (with a speed
//! payload) and Halt (no payload). Stop immediately returns to Idle through
//! an internal event.

use statemap::alloc::AllocStats;
use statemap::builder::StructuralDefect;
use statemap::fault::{CollectFaults, FaultHandler};
use statemap::prelude::*;
use statemap::{event_enum, state_enum};
use std::sync::{Arc, Once};
use tracing::info;

state_enum! {
    pub enum MotorState {
        Idle,
        Stop,
        Start,
        ChangeSpeed,
    }
}

event_enum! {
    pub enum MotorEvent {
        SetSpeed,
        Halt,
    }
}

#[derive(Debug, Default)]
pub struct Motor {
    current_speed: i32,
    idle_entries: usize,
}

#[derive(Debug, Clone)]
pub struct MotorData {
    speed: i32,
}

struct MotorMachine;

impl Machine for MotorMachine {
    type State = MotorState;
    type Event = MotorEvent;
    type Data = Motor;
    type Payload = MotorData;
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn st_idle(ctx: &mut Context<'_, MotorMachine>, _data: Option<&MotorData>) {
    info!(motor = ctx.instance_name(), "ST_Idle");
    ctx.data_mut().idle_entries += 1;
}

fn st_stop(ctx: &mut Context<'_, MotorMachine>, _data: Option<&MotorData>) {
    ctx.data_mut().current_speed = 0;
    info!(motor = ctx.instance_name(), speed = 0, "ST_Stop");
    ctx.internal_event(MotorState::Idle, None);
}

fn st_start(ctx: &mut Context<'_, MotorMachine>, data: Option<&MotorData>) {
    if let Some(data) = data {
        ctx.data_mut().current_speed = data.speed;
    }
    info!(
        motor = ctx.instance_name(),
        speed = ctx.data().current_speed,
        "ST_Start"
    );
}

fn st_change_speed(ctx: &mut Context<'_, MotorMachine>, data: Option<&MotorData>) {
    if let Some(data) = data {
        ctx.data_mut().current_speed = data.speed;
    }
    info!(
        motor = ctx.instance_name(),
        speed = ctx.data().current_speed,
        "ST_ChangeSpeed"
    );
}

fn builder() -> statemap::DescriptorBuilder<MotorMachine> {
    Descriptor::<MotorMachine>::builder("Motor")
        .state(MotorState::Idle, st_idle)
        .state(MotorState::Stop, st_stop)
        .state(MotorState::Start, st_start)
        .state(MotorState::ChangeSpeed, st_change_speed)
}

fn set_speed_table() -> TransitionTable<MotorState> {
    TransitionTable::from_entries(vec![
        Outcome::Goto(MotorState::Start),       // Idle
        Outcome::CannotHappen,                  // Stop
        Outcome::Goto(MotorState::ChangeSpeed), // Start
        Outcome::Goto(MotorState::ChangeSpeed), // ChangeSpeed
    ])
}

fn halt_table() -> TransitionTable<MotorState> {
    TransitionTable::from_fn(|state| match state {
        MotorState::Idle => Outcome::Ignored,
        MotorState::Stop => Outcome::CannotHappen,
        MotorState::Start | MotorState::ChangeSpeed => Outcome::Goto(MotorState::Stop),
    })
}

fn motor_descriptor() -> Arc<Descriptor<MotorMachine>> {
    init_tracing();
    let descriptor = builder()
        .transitions(MotorEvent::SetSpeed, set_speed_table())
        .transitions(MotorEvent::Halt, halt_table())
        .build()
        .expect("motor descriptor is well formed");
    Arc::new(descriptor)
}

fn set_speed(
    motor: &mut Instance<MotorMachine>,
    pool: &Arc<dyn EventAllocator>,
    speed: i32,
) -> Result<Dispatch<MotorState>, Fault> {
    let data = EventData::allocate_in(pool, MotorData { speed }).expect("pool has a free block");
    motor.external_event(MotorEvent::SetSpeed, Some(data))
}

fn pool() -> Arc<dyn EventAllocator> {
    Arc::new(FixedBlockPool::new(std::mem::size_of::<MotorData>(), 4))
}

#[test]
fn scenario_a_set_speed_from_idle_starts_motor() {
    let pool = pool();
    let mut motor = Instance::new("Motor1", motor_descriptor(), Motor::default());
    assert_eq!(motor.current_state(), MotorState::Idle);

    let dispatch = set_speed(&mut motor, &pool, 100).unwrap();

    assert_eq!(
        dispatch,
        Dispatch::Transitioned {
            from: MotorState::Idle,
            to: MotorState::Start,
            current: MotorState::Start,
            internal_hops: 0,
        }
    );
    assert_eq!(motor.current_state().index(), 2);
    assert_eq!(motor.data().current_speed, 100);
    assert!(pool.stats().is_balanced());
}

#[test]
fn scenario_b_set_speed_while_started_changes_speed() {
    let pool = pool();
    let mut motor = Instance::new("Motor1", motor_descriptor(), Motor::default());
    set_speed(&mut motor, &pool, 100).unwrap();

    set_speed(&mut motor, &pool, 200).unwrap();

    assert_eq!(motor.current_state(), MotorState::ChangeSpeed);
    assert_eq!(motor.current_state().index(), 3);
    assert_eq!(motor.data().current_speed, 200);
    assert!(pool.stats().is_balanced());
}

#[test]
fn scenario_c_halt_stops_then_returns_to_idle() {
    let pool = pool();
    let mut motor = Instance::new("Motor1", motor_descriptor(), Motor::default());
    set_speed(&mut motor, &pool, 100).unwrap();
    set_speed(&mut motor, &pool, 200).unwrap();

    let dispatch = motor.external_event(MotorEvent::Halt, None).unwrap();

    assert_eq!(
        dispatch,
        Dispatch::Transitioned {
            from: MotorState::ChangeSpeed,
            to: MotorState::Stop,
            current: MotorState::Idle,
            internal_hops: 1,
        }
    );
    assert_eq!(motor.current_state(), MotorState::Idle);
    assert_eq!(motor.data().current_speed, 0);
    assert!(motor.event_generated());
    // Record-only: Idle's behavior waits for the next event that enters it.
    assert_eq!(motor.data().idle_entries, 0);

    let path: Vec<_> = motor
        .history()
        .unwrap()
        .get_path()
        .into_iter()
        .copied()
        .collect();
    assert_eq!(
        path,
        vec![
            MotorState::Idle,
            MotorState::Start,
            MotorState::ChangeSpeed,
            MotorState::Stop,
            MotorState::Idle
        ]
    );
}

#[test]
fn scenario_c_with_cascade_runs_idle_behavior() {
    let config = EngineConfig::new().cascade(CascadePolicy::Cascade);
    let pool = pool();
    let mut motor = Instance::new("Motor1", motor_descriptor(), Motor::default())
        .with_config(config)
        .unwrap();
    set_speed(&mut motor, &pool, 100).unwrap();

    motor.external_event(MotorEvent::Halt, None).unwrap();

    assert_eq!(motor.current_state(), MotorState::Idle);
    assert_eq!(motor.data().idle_entries, 1);
    assert!(!motor.event_generated());
}

#[test]
fn scenario_d_halt_while_idle_is_ignored() {
    let mut motor = Instance::new("Motor1", motor_descriptor(), Motor::default());
    motor.data_mut().current_speed = 42;

    let dispatch = motor.external_event(MotorEvent::Halt, None).unwrap();

    assert_eq!(
        dispatch,
        Dispatch::Ignored {
            state: MotorState::Idle
        }
    );
    assert_eq!(motor.current_state(), MotorState::Idle);
    assert_eq!(motor.data().current_speed, 42);
    assert!(motor.history().unwrap().is_empty());
}

#[test]
fn scenario_e_short_transition_table_is_rejected_at_build() {
    let short = TransitionTable::from_entries(vec![
        Outcome::Goto(MotorState::Start),
        Outcome::CannotHappen,
        Outcome::Goto(MotorState::ChangeSpeed),
    ]);

    let err = builder()
        .transitions(MotorEvent::SetSpeed, short)
        .transitions(MotorEvent::Halt, halt_table())
        .build()
        .unwrap_err();

    assert_eq!(
        err.defects(),
        &[StructuralDefect::TableLengthMismatch {
            event: "SetSpeed",
            expected: 4,
            found: 3,
        }]
    );
}

/// Same tables, but Stop never leaves, so the Stop row is reachable.
struct StuckMachine;

impl Machine for StuckMachine {
    type State = MotorState;
    type Event = MotorEvent;
    type Data = Motor;
    type Payload = MotorData;
}

fn stay(_ctx: &mut Context<'_, StuckMachine>, _data: Option<&MotorData>) {}

fn stuck_in_stop<H: FaultHandler + 'static>(handler: H) -> Instance<StuckMachine> {
    init_tracing();
    let descriptor = Descriptor::<StuckMachine>::builder("StuckMotor")
        .state(MotorState::Idle, stay)
        .state(MotorState::Stop, stay)
        .state(MotorState::Start, stay)
        .state(MotorState::ChangeSpeed, stay)
        .transitions(MotorEvent::SetSpeed, set_speed_table())
        .transitions(MotorEvent::Halt, halt_table())
        .build()
        .unwrap();

    let mut motor = Instance::new("Stuck", Arc::new(descriptor), Motor::default())
        .with_fault_handler(handler);
    motor.external_event(MotorEvent::SetSpeed, None).unwrap();
    motor.external_event(MotorEvent::Halt, None).unwrap();
    assert_eq!(motor.current_state(), MotorState::Stop);
    motor
}

#[test]
fn set_speed_in_stop_faults_and_releases_payload() {
    let faults = CollectFaults::new();
    let pool = pool();
    let mut motor = stuck_in_stop(faults.clone());

    let data = EventData::allocate_in(&pool, MotorData { speed: 20 }).unwrap();
    let fault = motor
        .external_event(MotorEvent::SetSpeed, Some(data))
        .unwrap_err();

    assert_eq!(
        fault.kind,
        FaultKind::CannotHappen {
            event: "SetSpeed",
            state: "Stop"
        }
    );
    assert_eq!(fault.machine, "StuckMotor");
    assert_eq!(fault.instance_name, "Stuck");
    assert_eq!(motor.current_state(), MotorState::Stop);
    assert_eq!(motor.data().current_speed, 0);
    assert_eq!(faults.faults(), vec![fault]);
    assert!(pool.stats().is_balanced());
}

#[test]
fn halted_motor_refuses_further_events() {
    let faults = CollectFaults::new();
    let mut motor = stuck_in_stop(faults.clone());
    motor.external_event(MotorEvent::Halt, None).unwrap_err();

    let refused = motor
        .external_event(MotorEvent::SetSpeed, None)
        .unwrap_err();

    assert_eq!(refused.kind, FaultKind::Halted);
    assert!(motor.is_halted());
    assert_eq!(faults.faults().len(), 1);
}

#[test]
#[should_panic(expected = "cannot happen in state 'Stop'")]
fn panic_handler_halts_on_illegal_event() {
    let mut motor = stuck_in_stop(statemap::fault::PanicOnFault);

    let _ = motor.external_event(MotorEvent::SetSpeed, None);
}

#[test]
fn demo_sequence_balances_every_allocation() {
    let descriptor = motor_descriptor();
    let pool = pool();
    let mut motor1 = Instance::new("Motor1Public", Arc::clone(&descriptor), Motor::default());
    let mut motor2 = Instance::new("Motor2Public", Arc::clone(&descriptor), Motor::default());
    let mut private = Instance::new("MotorPrivate", descriptor, Motor::default());

    set_speed(&mut motor1, &pool, 100).unwrap();
    set_speed(&mut motor1, &pool, 200).unwrap();
    motor1.external_event(MotorEvent::Halt, None).unwrap();
    let ignored = motor1.external_event(MotorEvent::Halt, None).unwrap();
    assert!(ignored.is_ignored());

    set_speed(&mut motor2, &pool, 300).unwrap();
    motor2.external_event(MotorEvent::Halt, None).unwrap();

    set_speed(&mut private, &pool, 400).unwrap();
    assert_eq!(private.data().current_speed, 400);
    private.external_event(MotorEvent::Halt, None).unwrap();

    for motor in [&motor1, &motor2, &private] {
        assert_eq!(motor.current_state(), MotorState::Idle);
        assert_eq!(motor.data().current_speed, 0);
    }
    assert_ne!(motor1.id(), motor2.id());

    let stats: AllocStats = pool.stats();
    assert_eq!(stats.allocated, 4);
    assert!(stats.is_balanced());
    assert_eq!(stats.peak, 1);
}

#[test]
fn exhausted_pool_is_reported_before_dispatch() {
    let pool: Arc<dyn EventAllocator> = Arc::new(FixedBlockPool::new(
        std::mem::size_of::<MotorData>(),
        1,
    ));
    let mut motor = Instance::new("Motor1", motor_descriptor(), Motor::default());

    let held = EventData::allocate_in(&pool, MotorData { speed: 1 }).unwrap();
    let err = EventData::allocate_in(&pool, MotorData { speed: 2 }).unwrap_err();
    assert_eq!(err, statemap::alloc::AllocError::Exhausted { capacity: 1 });

    motor
        .external_event(MotorEvent::SetSpeed, Some(held))
        .unwrap();
    assert_eq!(motor.data().current_speed, 1);
    assert!(pool.stats().is_balanced());
}
