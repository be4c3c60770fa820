//! 请求/响应流量

mod echo;

pub use echo::{
    EPHEMERAL_PORT_BASE, EchoApps, EchoClientApp, EchoConfig, EchoServerApp, SendEchoRequest,
    TrafficPlan, install_echo,
};
