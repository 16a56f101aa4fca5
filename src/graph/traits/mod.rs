mod route;

pub use route::Route;
