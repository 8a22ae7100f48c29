//! Falling-blocks sandbox
//!
//! Headless demo of the engine core: a static floor, a shower of dynamic
//! crates pulled down by gravity, contact logging, and event-driven culling
//! once the level is cleared. A wall-clock frame timer drives the engine;
//! the world system's accumulator turns the variable frame deltas into
//! fixed simulation steps. Run with `RUST_LOG=info` to watch the
//! simulation settle.

use engine_2d::prelude::*;
use rand::Rng;
use std::time::Duration;

const SIM_CONFIG: &str = include_str!("../sim.ron");
const RUN_SECONDS: f32 = 12.0;
const CLEAR_SECONDS: f32 = 9.0;
const FRAME_PACE: Duration = Duration::from_millis(4);
const CRATE_COUNT: u32 = 12;

struct LandingLogger;

impl ContactListener for LandingLogger {
    fn begin_contact(
        &mut self,
        contact: &Contact,
        registry: &mut EntityRegistry,
        _commands: &mut CommandBuffer,
        _delta: f32,
    ) {
        let (a, b) = contact.fixtures();
        let tag = |id: EntityId| {
            registry
                .get(id)
                .map_or_else(|| String::from("?"), |e| e.tag().to_string())
        };
        log::info!("contact began: {} <-> {}", tag(a.entity), tag(b.entity));
    }

    fn continue_contact(
        &mut self,
        _contact: &Contact,
        _registry: &mut EntityRegistry,
        _commands: &mut CommandBuffer,
        _delta: f32,
    ) {
    }

    fn end_contact(
        &mut self,
        contact: &Contact,
        registry: &mut EntityRegistry,
        _commands: &mut CommandBuffer,
        _delta: f32,
    ) {
        let (a, b) = contact.fixtures();
        let tag = |id: EntityId| {
            registry
                .get(id)
                .map_or_else(|| String::from("?"), |e| e.tag().to_string())
        };
        log::info!("contact ended: {} <-> {}", tag(a.entity), tag(b.entity));
    }
}

fn crate_entity(index: u32, rng: &mut impl Rng, events: &mut EventManager) -> Entity {
    let x = rng.gen_range(-40.0..40.0);
    let y = rng.gen_range(20.0..80.0);

    let mut body = Body::new(BodyType::Dynamic).with_bounds(Rect::new(x, y, 2.0, 2.0));
    body.physics.gravity = Vec2::new(0.0, -10.0);
    body.physics.velocity.x = rng.gen_range(-5.0..5.0);
    body.add_fixture(Fixture::new("hull", Rect::new(0.0, 0.0, 2.0, 2.0)));

    // Crates vanish when the level is cleared
    let cull = CullOnEvent::new(std::iter::once(String::from("level_cleared")).collect());
    events.add_listener(cull.triggers().clone(), Box::new(cull.clone()));

    Entity::new(format!("crate_{index}"))
        .with_component(body)
        .with_component(CullablesComponent::new().with("on_clear", cull))
}

fn floor_entity() -> Entity {
    let mut body = Body::new(BodyType::Static).with_bounds(Rect::new(-100.0, -10.0, 200.0, 10.0));
    // Landed crates slide to a stop
    body.physics.friction_to_apply = Vec2::new(2.0, 0.0);
    body.add_fixture(Fixture::new("ground", Rect::new(0.0, 0.0, 200.0, 10.0)));
    Entity::new("floor").with_component(body)
}

fn live_crates(engine: &GameEngine) -> usize {
    engine
        .registry()
        .iter()
        .filter(|(_, entity)| entity.is_spawned() && entity.tag().starts_with("crate_"))
        .count()
}

fn main() {
    env_logger::init();

    let config: SimulationConfig = ron::from_str(SIM_CONFIG).unwrap_or_else(|err| {
        log::warn!("failed to parse sim.ron ({err}); using defaults");
        SimulationConfig::default()
    });

    let mut engine = GameEngine::new();
    let ppm = config.ppm;
    let world = WorldSystem::new(
        &config,
        Box::new(move || {
            Some(Box::new(GridWorldContainer::new(ppm)) as Box<dyn WorldContainer>)
        }),
    )
    .with_contact_listener(Box::new(LandingLogger));
    engine.add_system(world.into_system());
    engine.add_system(CullablesSystem.into_system());

    let mut events = EventManager::new();

    if engine.spawn(floor_entity(), Properties::new()).is_err() {
        log::error!("floor spawn rejected");
        return;
    }
    let mut rng = rand::thread_rng();
    for index in 0..CRATE_COUNT {
        let entity = crate_entity(index, &mut rng, &mut events);
        if engine.spawn(entity, Properties::new()).is_err() {
            log::warn!("crate_{index} spawn rejected");
        }
    }

    let mut timer = Timer::new();
    let mut cleared = false;
    while timer.total_time() < RUN_SECONDS {
        std::thread::sleep(FRAME_PACE);
        timer.update();

        if !cleared && timer.total_time() >= CLEAR_SECONDS {
            cleared = true;
            log::info!("level cleared, culling crates");
            events.submit(Event::new("level_cleared"));
        }
        events.run();

        if let Err(err) = engine.update(timer.delta_time()) {
            log::error!("engine update failed: {err}");
            break;
        }

        if timer.frame_count() % 500 == 0 {
            log::info!(
                "t={:.1}s, frame {}: {} crates live",
                timer.total_time(),
                timer.frame_count(),
                live_crates(&engine)
            );
        }
    }

    log::info!("simulation finished with {} crates live", live_crates(&engine));
    engine.dispose();
}
