#[macro_export]
macro_rules! engines {
    ($($engine:ident = $id:literal),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Engine {
            $($engine,)*
        }

        impl Engine {
            pub fn all() -> &'static [Engine] {
                &[$(Engine::$engine,)*]
            }

            pub fn id(&self) -> &'static str {
                match self {
                    $(Engine::$engine => $id,)*
                }
            }
        }

        impl std::str::FromStr for Engine {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($id => Ok(Engine::$engine),)*
                    _ => Err(format!(
                        "unknown engine {s:?}, expected one of: {}",
                        Engine::all().iter().map(Engine::id).collect::<Vec<_>>().join(", ")
                    )),
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for Engine {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

#[macro_export]
macro_rules! engine_requests {
    ($($engine:ident => $module:ident::$engine_id:ident::$request:ident, $parse_response:ident),* $(,)?) => {
        impl Engine {
            pub fn request(&self, query: &SearchQuery) -> eyre::Result<RequestResponse> {
                match self {
                    $(
                        Engine::$engine => $module::$engine_id::$request(query),
                    )*
                }
            }

            pub fn parse_response(&self, query: &SearchQuery, body: &str) -> eyre::Result<EngineResponse> {
                match self {
                    $(
                        Engine::$engine => $module::$engine_id::$parse_response(query, body),
                    )*
                }
            }
        }
    };
}
