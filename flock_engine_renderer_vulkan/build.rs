// build.rs
// Compiles the workspace GLSL shaders to SPIR-V with glslc.
//
// Output goes to $OUT_DIR/shaders as `<source name>.spv` (mesh.vert -> mesh.vert.spv)
// and the directory is exported as FLOCK_SHADER_DIR. Without glslc the build
// still succeeds; loading a pipeline then fails with a missing-shader error.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const SHADER_EXTENSIONS: [&str; 3] = ["vert", "frag", "comp"];

fn find_glslc() -> Option<PathBuf> {
    println!("cargo:rerun-if-env-changed=VULKAN_SDK");
    if let Ok(sdk) = env::var("VULKAN_SDK") {
        let name = if cfg!(target_os = "windows") { "Bin/glslc.exe" } else { "bin/glslc" };
        let path = Path::new(&sdk).join(name);
        if path.exists() {
            return Some(path);
        }
    }
    // Fall back to PATH
    match Command::new("glslc").arg("--version").output() {
        Ok(output) if output.status.success() => Some(PathBuf::from("glslc")),
        _ => None,
    }
}

fn compile(glslc: &Path, source: &Path, output: &Path) -> bool {
    match Command::new(glslc).arg(source).arg("-o").arg(output).status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            println!("cargo:warning=glslc failed for {} ({})", source.display(), status);
            false
        }
        Err(e) => {
            println!("cargo:warning=Failed to run glslc for {}: {}", source.display(), e);
            false
        }
    }
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap_or_default());
    let shader_src = manifest_dir.join("..").join("shaders");
    let shader_out = out_dir.join("shaders");

    println!("cargo:rerun-if-changed={}", shader_src.display());
    println!("cargo:rustc-env=FLOCK_SHADER_DIR={}", shader_out.display());

    if let Err(e) = std::fs::create_dir_all(&shader_out) {
        println!("cargo:warning=Cannot create {}: {}", shader_out.display(), e);
        return;
    }

    let Some(glslc) = find_glslc() else {
        println!("cargo:warning=glslc not found (set VULKAN_SDK or add it to PATH); shaders not compiled");
        return;
    };

    let Ok(entries) = std::fs::read_dir(&shader_src) else {
        println!("cargo:warning=No shader directory at {}", shader_src.display());
        return;
    };

    let mut compiled = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_shader = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SHADER_EXTENSIONS.contains(&e));
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_shader {
            continue;
        }

        println!("cargo:rerun-if-changed={}", path.display());
        if compile(&glslc, &path, &shader_out.join(format!("{}.spv", file_name))) {
            compiled += 1;
        }
    }
    eprintln!("info: Compiled {} shader(s) into {}", compiled, shader_out.display());
}
