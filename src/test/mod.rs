mod address_plan;
mod mobility;
mod routing_install;
mod scenario;
mod simulator;
