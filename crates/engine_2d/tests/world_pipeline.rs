//! Full-pipeline physics tests: engine, world system, and grid container

use approx::assert_relative_eq;
use engine_2d::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn simulation_config() -> SimulationConfig {
    SimulationConfig {
        fixed_step: 0.02,
        ppm: 10.0,
        fixed_step_scalar: 1.0,
    }
}

fn grid_supplier(ppm: f32) -> Box<dyn FnMut() -> Option<Box<dyn WorldContainer>>> {
    Box::new(move || Some(Box::new(GridWorldContainer::new(ppm)) as Box<dyn WorldContainer>))
}

fn world_system(config: &SimulationConfig) -> WorldSystem {
    WorldSystem::new(config, grid_supplier(config.ppm))
}

#[test]
fn gravity_accelerates_a_spawned_body_per_fixed_step() {
    let config = simulation_config();
    let mut engine = GameEngine::new();
    engine.add_system(world_system(&config).into_system());

    let mut body = Body::new(BodyType::Dynamic).with_bounds(Rect::new(0.0, 100.0, 2.0, 2.0));
    body.physics.gravity = Vec2::new(0.0, -10.0);
    body.physics.flags = PhysicsFlags::GRAVITY_ON;
    let id = engine
        .spawn(Entity::new("faller").with_component(body), Properties::new())
        .unwrap();

    // Tick 1 spawns the entity; the world system runs one 0.02s cycle
    engine.update(0.02).unwrap();
    let velocity = engine
        .registry()
        .get(id)
        .and_then(|e| e.get_component::<Body>())
        .map(|b| b.physics.velocity.y)
        .unwrap();
    assert_relative_eq!(velocity, -0.2, epsilon = 1e-6);

    engine.update(0.02).unwrap();
    let velocity = engine
        .registry()
        .get(id)
        .and_then(|e| e.get_component::<Body>())
        .map(|b| b.physics.velocity.y)
        .unwrap();
    assert_relative_eq!(velocity, -0.4, epsilon = 1e-6);

    // 50 cycles in total accumulate a full -10
    for _ in 0..48 {
        engine.update(0.02).unwrap();
    }
    let velocity = engine
        .registry()
        .get(id)
        .and_then(|e| e.get_component::<Body>())
        .map(|b| b.physics.velocity.y)
        .unwrap();
    assert_relative_eq!(velocity, -10.0, epsilon = 1e-4);
}

struct CountingListener {
    begins: Rc<RefCell<u32>>,
    continues: Rc<RefCell<u32>>,
    ends: Rc<RefCell<u32>>,
}

impl ContactListener for CountingListener {
    fn begin_contact(
        &mut self,
        _contact: &Contact,
        _registry: &mut EntityRegistry,
        _commands: &mut CommandBuffer,
        _delta: f32,
    ) {
        *self.begins.borrow_mut() += 1;
    }

    fn continue_contact(
        &mut self,
        _contact: &Contact,
        _registry: &mut EntityRegistry,
        _commands: &mut CommandBuffer,
        _delta: f32,
    ) {
        *self.continues.borrow_mut() += 1;
    }

    fn end_contact(
        &mut self,
        _contact: &Contact,
        _registry: &mut EntityRegistry,
        _commands: &mut CommandBuffer,
        _delta: f32,
    ) {
        *self.ends.borrow_mut() += 1;
    }
}

fn sensor_entity(tag: &str, bounds: Rect) -> Entity {
    let mut body = Body::new(BodyType::Abstract).with_bounds(bounds);
    body.physics.flags = PhysicsFlags::empty();
    body.add_fixture(Fixture::new("sensor", Rect::new(0.0, 0.0, bounds.width, bounds.height)));
    Entity::new(tag).with_component(body)
}

#[test]
fn contact_transitions_fire_exactly_once_each() {
    let begins = Rc::new(RefCell::new(0));
    let continues = Rc::new(RefCell::new(0));
    let ends = Rc::new(RefCell::new(0));

    let config = simulation_config();
    let world = world_system(&config).with_contact_listener(Box::new(CountingListener {
        begins: Rc::clone(&begins),
        continues: Rc::clone(&continues),
        ends: Rc::clone(&ends),
    }));
    let mut engine = GameEngine::new();
    engine.add_system(world.into_system());

    engine
        .spawn(sensor_entity("a", Rect::new(0.0, 0.0, 4.0, 4.0)), Properties::new())
        .unwrap();
    let b = engine
        .spawn(sensor_entity("b", Rect::new(2.0, 2.0, 4.0, 4.0)), Properties::new())
        .unwrap();

    engine.update(0.02).unwrap(); // begin
    engine.update(0.02).unwrap(); // continue

    if let Some(body) = engine
        .registry_mut()
        .get_mut(b)
        .and_then(|e| e.get_component_mut::<Body>())
    {
        body.bounds.translate(100.0, 0.0);
    }
    engine.update(0.02).unwrap(); // end

    assert_eq!(*begins.borrow(), 1);
    assert_eq!(*continues.borrow(), 1);
    assert_eq!(*ends.borrow(), 1);
}

#[test]
fn falling_block_lands_on_static_floor_and_stays() {
    let config = simulation_config();
    let mut engine = GameEngine::new();
    engine.add_system(world_system(&config).into_system());

    let floor = Body::new(BodyType::Static).with_bounds(Rect::new(-50.0, -5.0, 100.0, 5.0));
    engine
        .spawn(Entity::new("floor").with_component(floor), Properties::new())
        .unwrap();

    let mut block = Body::new(BodyType::Dynamic).with_bounds(Rect::new(-1.0, 10.0, 2.0, 2.0));
    block.physics.gravity = Vec2::new(0.0, -10.0);
    let block = engine
        .spawn(Entity::new("block").with_component(block), Properties::new())
        .unwrap();

    for _ in 0..300 {
        engine.update(0.02).unwrap();
    }

    let bounds = engine
        .registry()
        .get(block)
        .and_then(|e| e.get_component::<Body>())
        .map(|b| b.bounds)
        .unwrap();
    // Resting on the floor's top edge, never sunk through
    assert_relative_eq!(bounds.y, 0.0, epsilon = 1e-3);
}

#[test]
fn contact_filter_vetoes_pairs() {
    struct NoDamagerPairs;

    impl ContactFilter for NoDamagerPairs {
        fn filter(&self, a: &Fixture, b: &Fixture) -> bool {
            !(a.tag == "damager" && b.tag == "damager")
        }
    }

    let begins = Rc::new(RefCell::new(0));
    let config = simulation_config();
    let world = world_system(&config)
        .with_contact_filter(Box::new(NoDamagerPairs))
        .with_contact_listener(Box::new(CountingListener {
            begins: Rc::clone(&begins),
            continues: Rc::new(RefCell::new(0)),
            ends: Rc::new(RefCell::new(0)),
        }));
    let mut engine = GameEngine::new();
    engine.add_system(world.into_system());

    let make = |tag: &str, bounds: Rect| {
        let mut body = Body::new(BodyType::Abstract).with_bounds(bounds);
        body.physics.flags = PhysicsFlags::empty();
        body.add_fixture(Fixture::new(
            "damager",
            Rect::new(0.0, 0.0, bounds.width, bounds.height),
        ));
        Entity::new(tag).with_component(body)
    };
    engine
        .spawn(make("a", Rect::new(0.0, 0.0, 4.0, 4.0)), Properties::new())
        .unwrap();
    engine
        .spawn(make("b", Rect::new(2.0, 2.0, 4.0, 4.0)), Properties::new())
        .unwrap();

    engine.update(0.02).unwrap();
    assert_eq!(*begins.borrow(), 0);
}

#[test]
fn destroyed_body_leaves_the_simulation() {
    let begins = Rc::new(RefCell::new(0));
    let ends = Rc::new(RefCell::new(0));

    let config = simulation_config();
    let world = world_system(&config).with_contact_listener(Box::new(CountingListener {
        begins: Rc::clone(&begins),
        continues: Rc::new(RefCell::new(0)),
        ends: Rc::clone(&ends),
    }));
    let mut engine = GameEngine::new();
    engine.add_system(world.into_system());

    engine
        .spawn(sensor_entity("a", Rect::new(0.0, 0.0, 4.0, 4.0)), Properties::new())
        .unwrap();
    let b = engine
        .spawn(sensor_entity("b", Rect::new(2.0, 2.0, 4.0, 4.0)), Properties::new())
        .unwrap();

    engine.update(0.02).unwrap();
    assert_eq!(*begins.borrow(), 1);

    engine.destroy(b);
    engine.update(0.02).unwrap();
    // The partner vanished before this cycle, so the contact ends
    assert_eq!(*ends.borrow(), 1);
}
