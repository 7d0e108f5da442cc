use dispatch_core::config::DispatchConfig;
use dispatch_core::graph::NodeId;
use dispatch_core::model::{Driver, DriverId, PassengerId, Ride, RideId};
use dispatch_core::service::DispatchService;
use tokio::runtime::Handle;

pub fn node(name: &str) -> NodeId {
    NodeId::new(name)
}

/// Service over `config`, spawning trips on the current tokio runtime.
pub fn start_service(config: &DispatchConfig) -> DispatchService {
    DispatchService::new(config, Handle::current()).expect("service")
}

/// Register `(driver_id, location)` pairs.
pub fn add_drivers(service: &DispatchService, drivers: &[(&str, &str)]) {
    for (id, location) in drivers {
        service
            .add_driver(DriverId::new(*id), node(location))
            .expect("add driver");
    }
}

pub fn request(service: &DispatchService, passenger: &str, source: &str, destination: &str) {
    service
        .request_ride(PassengerId::new(passenger), node(source), node(destination))
        .expect("request ride");
}

pub fn driver(service: &DispatchService, id: &str) -> Driver {
    service.with_state(|state| state.driver(&DriverId::new(id)).cloned().expect("driver"))
}

pub fn ride(service: &DispatchService, id: u64) -> Ride {
    service.with_state(|state| state.ride(RideId(id)).cloned().expect("ride"))
}

pub fn pending_passengers(service: &DispatchService) -> Vec<String> {
    service.with_state(|state| {
        state
            .pending()
            .iter()
            .map(|request| request.passenger_id.to_string())
            .collect()
    })
}
