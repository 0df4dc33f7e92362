use std::ffi::{c_char, c_void, CStr, CString};

use eframe::glow;

type GetSubroutineIndex =
    unsafe extern "system" fn(program: u32, shader_type: u32, name: *const c_char) -> u32;
type UniformSubroutinesuiv =
    unsafe extern "system" fn(shader_type: u32, count: i32, indices: *const u32);

/// Loader handed out by eframe for the current GL context.
pub type ProcAddressLoader<'a> = &'a dyn Fn(&CStr) -> *const c_void;

/// The two shader subroutine entry points, which glow does not wrap.
#[derive(Clone, Copy)]
pub struct SubroutineFns {
    get_subroutine_index: GetSubroutineIndex,
    uniform_subroutines_uiv: UniformSubroutinesuiv,
}

impl std::fmt::Debug for SubroutineFns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SubroutineFns")
    }
}

impl SubroutineFns {
    /// `None` when the driver does not export either function.
    pub fn load(get_proc_address: ProcAddressLoader<'_>) -> Option<Self> {
        let get_subroutine_index = get_proc_address(c"glGetSubroutineIndex");
        let uniform_subroutines_uiv = get_proc_address(c"glUniformSubroutinesuiv");
        if get_subroutine_index.is_null() || uniform_subroutines_uiv.is_null() {
            log::warn!("glGetSubroutineIndex / glUniformSubroutinesuiv not exported by the driver");
            return None;
        }

        // SAFETY: both pointers are non-null and were resolved by the context's own loader
        // under their GL names, so they have the GL signatures declared above.
        unsafe {
            Some(Self {
                get_subroutine_index: std::mem::transmute::<*const c_void, GetSubroutineIndex>(
                    get_subroutine_index,
                ),
                uniform_subroutines_uiv: std::mem::transmute::<
                    *const c_void,
                    UniformSubroutinesuiv,
                >(uniform_subroutines_uiv),
            })
        }
    }

    /// # Safety
    /// The context these functions were loaded from must be current.
    pub unsafe fn index(&self, program: glow::Program, stage: u32, name: &str) -> u32 {
        let Ok(name) = CString::new(name) else {
            return glow::INVALID_INDEX;
        };
        (self.get_subroutine_index)(program.0.get(), stage, name.as_ptr())
    }

    /// # Safety
    /// The context must be current and `indices` must cover every active subroutine uniform
    /// location of the program in use.
    pub unsafe fn upload(&self, stage: u32, indices: &[u32]) {
        (self.uniform_subroutines_uiv)(stage, indices.len() as i32, indices.as_ptr());
    }
}

/// Resolves every name, or reports the first one the program does not know. A single invalid
/// index makes the whole upload fail, so nothing is uploaded in that case.
pub fn resolve_indices<'a>(
    names: &[&'a str],
    mut resolve: impl FnMut(&str) -> u32,
) -> Result<Vec<u32>, &'a str> {
    names
        .iter()
        .map(|&name| match resolve(name) {
            glow::INVALID_INDEX => Err(name),
            index => Ok(index),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn missing_entry_points_give_none() {
        let nothing = |_: &CStr| ptr::null::<c_void>();
        assert!(SubroutineFns::load(&nothing).is_none());

        // Only one of the two exported is still unusable.
        let half = |name: &CStr| {
            if name == c"glGetSubroutineIndex" {
                0x1000 as *const c_void
            } else {
                ptr::null()
            }
        };
        assert!(SubroutineFns::load(&half).is_none());
    }

    #[test]
    fn indices_keep_name_order() {
        let table = [("DiffuseEnabled", 0), ("SpecularEnabled", 1), ("Disabled", 2)];
        let lookup = |name: &str| {
            table
                .iter()
                .find(|(known, _)| *known == name)
                .map_or(glow::INVALID_INDEX, |(_, index)| *index)
        };
        assert_eq!(resolve_indices(&["Disabled", "SpecularEnabled"], lookup), Ok(vec![2, 1]));
    }

    #[test]
    fn unknown_name_blocks_the_upload() {
        let lookup = |name: &str| {
            if name == "DiffuseEnabled" {
                0
            } else {
                glow::INVALID_INDEX
            }
        };
        assert_eq!(
            resolve_indices(&["DiffuseEnabled", "Specular"], lookup),
            Err("Specular")
        );
    }
}
