mod test_sampler_basic;
mod test_tunnel_basic;
