use component_macros::Component;
use infrastructure_common::Injectable;
use std::sync::Arc;

#[derive(Component)]
struct Clock;

#[derive(Component)]
#[component(name = "scheduler")]
struct Scheduler {
    clock: Arc<Clock>,
    #[component(property = "scheduler.interval_ms", default)]
    interval_ms: u64,
    #[component(default)]
    jobs: Vec<String>,
}

#[derive(Component)]
struct Wrapper(Arc<Scheduler>);

fn main() {
    // 生成的实现无需手写 Injectable
    assert_eq!(Clock::definition().name(), "Clock");
    assert_eq!(Scheduler::definition().name(), "scheduler");
    assert_eq!(Wrapper::definition().constructors()[0].arity(), 1);
}
