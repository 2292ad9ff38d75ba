pub mod network_mesh;
