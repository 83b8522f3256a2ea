use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
    println!("cargo:rerun-if-env-changed=SDL2_DIR");
    println!("cargo:rerun-if-env-changed=VCPKG_ROOT");
    println!("cargo:rerun-if-env-changed=VCPKGRS_DYNAMIC");
    println!("cargo:rerun-if-env-changed=VCPKGRS_TRIPLET");

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        return;
    }

    let mut need_sdl2 = env::var_os("CARGO_FEATURE_BUNDLED").is_none();
    if need_sdl2 {
        if let Some(sdl2_dir) = env::var_os("SDL2_DIR") {
            let library_dir = PathBuf::from(sdl2_dir).join("lib");
            println!("cargo:rustc-link-search=native={}", library_dir.display());
            need_sdl2 = false;
        }
    }

    let need_ffmpeg = env::var_os("FFMPEG_DIR").is_none();
    if !need_ffmpeg && !need_sdl2 {
        return;
    }

    let vcpkg_root = match env::var("VCPKG_ROOT") {
        Ok(value) => value,
        Err(_) => {
            println!(
                "cargo:warning=FFMPEG_DIR is not set. On Windows, install FFmpeg and SDL2 via vcpkg and set VCPKG_ROOT + FFMPEG_DIR for reliable builds (or enable the `bundled` feature for SDL2)."
            );
            return;
        }
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let install_dir = PathBuf::from(&vcpkg_root).join("installed").join(&triplet);

    if need_ffmpeg {
        if install_dir.join("include").join("libavformat").exists() {
            println!(
                "cargo:warning=Detected vcpkg FFmpeg at {}. Set FFMPEG_DIR={} to make ffmpeg-sys-next discovery explicit.",
                install_dir.display(),
                install_dir.display(),
            );
            if env::var_os("VCPKGRS_DYNAMIC").is_none() {
                println!(
                    "cargo:warning=Consider setting VCPKGRS_DYNAMIC=1 when using vcpkg dynamic FFmpeg builds on Windows."
                );
            }
        } else {
            println!(
                "cargo:warning=VCPKG_ROOT is set but no FFmpeg install was found at {}.",
                install_dir.display(),
            );
        }
    }

    if need_sdl2 {
        let library_dir = install_dir.join("lib");
        if library_dir.join("SDL2.lib").exists() {
            println!("cargo:rustc-link-search=native={}", library_dir.display());
        } else {
            println!(
                "cargo:warning=No vcpkg SDL2 found at {}. Install sdl2 via vcpkg, set SDL2_DIR, or enable the `bundled` feature.",
                install_dir.display(),
            );
        }
    }
}
