//! File storage adapter and upload routes under `src/storage/`.

use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

fn storage(base: &Path, file: &str) -> PathBuf {
    base.join("src").join("storage").join(file)
}

/// `src/storage/storage.ts`: the `Storage` interface and a local-disk backend.
pub struct StorageTs;

impl GeneratedFile for StorageTs {
    fn path(&self, base: &Path) -> PathBuf {
        storage(base, "storage.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import { promises as fs } from 'fs';
import * as path from 'path';

export const STORAGE = Symbol('STORAGE');

export interface Storage {
  put(key: string, data: Buffer): Promise<void>;
  /** Resolves to null when nothing is stored under `key`. */
  get(key: string): Promise<Buffer | null>;
  /** Resolves to false when nothing was stored under `key`. */
  delete(key: string): Promise<boolean>;
  url(key: string): string;
}

/** Rejects keys that could escape the storage root. */
export function sanitizeKey(key: string): string | null {
  if (!key || key.startsWith('/') || key.includes('\\')) {
    return null;
  }
  if (key.split('/').some((part) => part === '' || part === '.' || part === '..')) {
    return null;
  }
  return key;
}

function isNotFound(error: unknown): boolean {
  return (error as NodeJS.ErrnoException).code === 'ENOENT';
}

export class LocalStorage implements Storage {
  constructor(private readonly root: string) {}

  private resolve(key: string): string {
    const clean = sanitizeKey(key);
    if (clean === null) {
      throw new Error(`invalid storage key '${key}'`);
    }
    return path.join(this.root, clean);
  }

  async put(key: string, data: Buffer): Promise<void> {
    const file = this.resolve(key);
    await fs.mkdir(path.dirname(file), { recursive: true });
    await fs.writeFile(file, data);
  }

  async get(key: string): Promise<Buffer | null> {
    try {
      return await fs.readFile(this.resolve(key));
    } catch (error) {
      if (isNotFound(error)) {
        return null;
      }
      throw error;
    }
  }

  async delete(key: string): Promise<boolean> {
    try {
      await fs.unlink(this.resolve(key));
      return true;
    } catch (error) {
      if (isNotFound(error)) {
        return false;
      }
      throw error;
    }
  }

  url(key: string): string {
    return `/uploads/${key}`;
  }
}
"#
        .to_string()
    }
}

/// `src/storage/storage.module.ts`: provides the configured backend.
pub struct StorageModuleTs;

impl GeneratedFile for StorageModuleTs {
    fn path(&self, base: &Path) -> PathBuf {
        storage(base, "storage.module.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import { Global, Module } from '@nestjs/common';

import { loadConfig } from '../config';
import { LocalStorage, STORAGE } from './storage';
import { UploadsController } from './uploads.controller';

@Global()
@Module({
  controllers: [UploadsController],
  providers: [{ provide: STORAGE, useFactory: () => new LocalStorage(loadConfig().uploadDir) }],
  exports: [STORAGE],
})
export class StorageModule {}
"#
        .to_string()
    }
}

/// `src/storage/uploads.controller.ts`: `POST /uploads`, `GET` and `DELETE /uploads/:key`.
pub struct UploadsControllerTs {
    pub auth: bool,
}

impl GeneratedFile for UploadsControllerTs {
    fn path(&self, base: &Path) -> PathBuf {
        storage(base, "uploads.controller.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let (guard_import, guard) = if self.auth {
            (
                "import { JwtAuthGuard } from '../auth/jwt-auth.guard';\n",
                "  @UseGuards(JwtAuthGuard)\n",
            )
        } else {
            ("", "")
        };
        let common = if self.auth {
            "BadRequestException, Controller, Delete, Get, HttpCode, Inject, NotFoundException, Param, Post, Res, UploadedFile, UseGuards, UseInterceptors"
        } else {
            "BadRequestException, Controller, Delete, Get, HttpCode, Inject, NotFoundException, Param, Post, Res, UploadedFile, UseInterceptors"
        };

        format!(
            r#"import {{ randomUUID }} from 'crypto';
import * as path from 'path';

import {{
  {common},
}} from '@nestjs/common';
import {{ FileInterceptor }} from '@nestjs/platform-express';
import {{ Response }} from 'express';

{guard_import}import {{ STORAGE, Storage, sanitizeKey }} from './storage';

export interface UploadResponse {{
  key: string;
  url: string;
  size: number;
}}

@Controller('uploads')
export class UploadsController {{
  constructor(@Inject(STORAGE) private readonly storage: Storage) {{}}

  @Post()
{guard}  @UseInterceptors(FileInterceptor('file'))
  async upload(@UploadedFile() file?: Express.Multer.File): Promise<UploadResponse> {{
    if (!file) {{
      throw new BadRequestException("multipart field 'file' is required");
    }}
    const key = `${{randomUUID()}}${{path.extname(file.originalname)}}`;
    await this.storage.put(key, file.buffer);
    return {{ key, url: this.storage.url(key), size: file.size }};
  }}

  @Get(':key')
  async download(@Param('key') key: string, @Res() res: Response): Promise<void> {{
    if (sanitizeKey(key) === null) {{
      throw new BadRequestException('invalid key');
    }}
    const data = await this.storage.get(key);
    if (!data) {{
      throw new NotFoundException(`upload ${{key}} not found`);
    }}
    res.type('application/octet-stream').send(data);
  }}

  @Delete(':key')
{guard}  @HttpCode(204)
  async remove(@Param('key') key: string): Promise<void> {{
    if (sanitizeKey(key) === null) {{
      throw new BadRequestException('invalid key');
    }}
    if (!(await this.storage.delete(key))) {{
      throw new NotFoundException(`upload ${{key}} not found`);
    }}
  }}
}}
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploads_guarded_only_with_auth() {
        let open = UploadsControllerTs { auth: false }.render();
        assert!(!open.contains("JwtAuthGuard"));
        assert!(!open.contains("UseGuards"));

        let guarded = UploadsControllerTs { auth: true }.render();
        assert_eq!(guarded.matches("@UseGuards(JwtAuthGuard)").count(), 2);
    }
}
